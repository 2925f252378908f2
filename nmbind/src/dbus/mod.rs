//! Bus transports.
//!
//! [`DbusTransport`] talks to a real daemon through zbus; [`MemoryBus`] serves
//! an in-process object table.

pub(crate) mod memory;
pub(crate) mod transport;

pub use memory::{MemoryBus, MethodHandler, RecordedCall};
pub use transport::{DbusTransport, EventSource, Transport};
