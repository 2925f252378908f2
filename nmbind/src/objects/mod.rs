//! Typed wrappers for NetworkManager objects.
//!
//! Each wrapper holds one [`ObjectProxy`](crate::core::object_proxy::ObjectProxy)
//! and nothing else. Building one costs nothing; every accessor is a remote
//! read. Accessors that yield other objects return further wrappers, so the
//! graph is walked one call at a time.

mod access_point;
mod active_connection;
pub(crate) mod connection;
mod device;
mod dhcp4_config;
mod ip4_config;
mod settings;

pub use access_point::AccessPoint;
pub use active_connection::ActiveConnection;
pub use connection::Connection;
pub use device::{AnyDevice, Device, WirelessDevice};
pub use dhcp4_config::Dhcp4Config;
pub use ip4_config::Ip4Config;
pub use settings::Settings;
