//! Generic remote-object machinery.
//!
//! Value coercion, the object proxy every wrapper is built on, and the
//! event subscription channel.

pub mod coerce;
pub mod object_proxy;
pub(crate) mod subscription;
