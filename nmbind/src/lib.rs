//! Typed access to the NetworkManager object graph over D-Bus.
//!
//! NetworkManager publishes devices, saved profiles, active connections and
//! access points as D-Bus objects that reference each other by path. This
//! crate wraps each kind of object in a small typed handle and lets you walk
//! the graph one call at a time:
//!
//! - [`NetworkManager`] is the entry point: devices, active connections,
//!   activation, the settings service and event subscription
//! - [`AnyDevice`] picks the right wrapper for a device at runtime
//!   ([`Device`] or [`WirelessDevice`])
//! - [`Connection`], [`ActiveConnection`], [`Settings`], [`AccessPoint`],
//!   [`Ip4Config`] and [`Dhcp4Config`] cover the rest
//!
//! Nothing is cached. Every accessor is a fresh remote read, and a handle to
//! an object the daemon has since removed fails instead of returning stale or
//! default data.
//!
//! # Example
//!
//! ```no_run
//! use nmbind::NetworkManager;
//!
//! # async fn example() -> nmbind::Result<()> {
//! let nm = NetworkManager::new().await?;
//! println!("networking is {}", nm.state().await?);
//!
//! for device in nm.devices().await? {
//!     let base = device.as_ref();
//!     println!("{}: {}", base.interface().await?, base.state().await?);
//! }
//!
//! for conn in nm.settings().list_connections().await? {
//!     // Secrets are never included.
//!     let settings = conn.settings().await?;
//!     println!("{:?}", settings.get("connection"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`](Result), failing with [`NmError`].
//! [`NmError::is_stale_reference`] tells apart "the object may be gone, list
//! again from the parent" from transport and type errors. Nothing is retried
//! automatically.
//!
//! # Events
//!
//! [`NetworkManager::subscribe`] installs one signal filter covering every
//! object under the NetworkManager root and returns an [`EventStream`]. The
//! buffer is bounded; when it is full, new events are dropped and counted.
//!
//! # Testing
//!
//! The bus sits behind the [`Transport`] trait. [`MemoryBus`] implements it
//! with an in-process object table, so code built on this crate can be
//! tested without a running daemon.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

pub mod api;
pub mod core;
pub mod dbus;
pub mod objects;
pub mod types;

pub use api::config::ClientConfig;
pub use api::models::{
    ActiveConnectionState, ConnectionSettings, DeviceState, DeviceType, Event, NmError, NmState,
    Update2Flags, VariantMap,
};
pub use api::network_manager::NetworkManager;
pub use api::render::{Render, RenderMap, RenderValue};
pub use crate::core::object_proxy::ObjectProxy;
pub use crate::core::subscription::EventStream;
pub use dbus::{DbusTransport, MemoryBus, Transport};
pub use objects::{
    AccessPoint, ActiveConnection, AnyDevice, Connection, Device, Dhcp4Config, Ip4Config,
    Settings, WirelessDevice,
};

pub type Result<T> = std::result::Result<T, NmError>;
