use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::types::constants::{dbus_errors, device_type};

/// Connection settings as NetworkManager stores them.
///
/// Maps a setting group name (`"connection"`, `"802-11-wireless"`, `"ipv4"`, ...)
/// to the keys of that group. Values keep whatever type the daemon sent; the
/// schema belongs to NetworkManager, not to this crate.
pub type ConnectionSettings = HashMap<String, HashMap<String, OwnedValue>>;

/// A D-Bus `a{sv}` dictionary with its variant leaves unwrapped.
pub type VariantMap = HashMap<String, OwnedValue>;

/// Overall networking state of the NetworkManager daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NmState {
    /// Networking state is unknown.
    Unknown,
    /// Networking is not enabled, the system is being suspended or resumed.
    Asleep,
    /// There is no active network connection.
    Disconnected,
    /// Network connections are being cleaned up.
    Disconnecting,
    /// A network connection is being started.
    Connecting,
    /// There is only local IPv4 and/or IPv6 connectivity.
    ConnectedLocal,
    /// There is only site-wide IPv4 and/or IPv6 connectivity.
    ConnectedSite,
    /// There is global IPv4 and/or IPv6 Internet connectivity.
    ConnectedGlobal,
    /// Unknown state code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for NmState {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            10 => Self::Asleep,
            20 => Self::Disconnected,
            30 => Self::Disconnecting,
            40 => Self::Connecting,
            50 => Self::ConnectedLocal,
            60 => Self::ConnectedSite,
            70 => Self::ConnectedGlobal,
            v => Self::Other(v),
        }
    }
}

impl Display for NmState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Asleep => write!(f, "Asleep"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Disconnecting => write!(f, "Disconnecting"),
            Self::Connecting => write!(f, "Connecting"),
            Self::ConnectedLocal => write!(f, "ConnectedLocal"),
            Self::ConnectedSite => write!(f, "ConnectedSite"),
            Self::ConnectedGlobal => write!(f, "ConnectedGlobal"),
            Self::Other(v) => write!(f, "Other({v})"),
        }
    }
}

/// NetworkManager device types.
///
/// This is the discriminant that device dispatch reads to pick a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// The device type is unknown.
    Unknown,
    /// Wired Ethernet device.
    Ethernet,
    /// Wi-Fi (802.11) wireless device.
    Wifi,
    /// Bluetooth device.
    Bluetooth,
    /// Generic device with no type-specific support.
    Generic,
    /// WireGuard interface.
    WireGuard,
    /// Loopback device (localhost).
    Loopback,
    /// Device type without a dedicated variant, with raw code.
    Other(u32),
}

impl DeviceType {
    /// Returns the raw NetworkManager code for this type.
    pub fn code(&self) -> u32 {
        match self {
            Self::Unknown => device_type::UNKNOWN,
            Self::Ethernet => device_type::ETHERNET,
            Self::Wifi => device_type::WIFI,
            Self::Bluetooth => device_type::BLUETOOTH,
            Self::Generic => device_type::GENERIC,
            Self::WireGuard => device_type::WIREGUARD,
            Self::Loopback => device_type::LOOPBACK,
            Self::Other(v) => *v,
        }
    }
}

impl From<u32> for DeviceType {
    fn from(value: u32) -> Self {
        match value {
            device_type::UNKNOWN => Self::Unknown,
            device_type::ETHERNET => Self::Ethernet,
            device_type::WIFI => Self::Wifi,
            device_type::BLUETOOTH => Self::Bluetooth,
            device_type::GENERIC => Self::Generic,
            device_type::WIREGUARD => Self::WireGuard,
            device_type::LOOPBACK => Self::Loopback,
            v => Self::Other(v),
        }
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Ethernet => write!(f, "Ethernet"),
            Self::Wifi => write!(f, "Wi-Fi"),
            Self::Bluetooth => write!(f, "Bluetooth"),
            Self::Generic => write!(f, "Generic"),
            Self::WireGuard => write!(f, "WireGuard"),
            Self::Loopback => write!(f, "Loopback"),
            Self::Other(v) => write!(f, "Other({v})"),
        }
    }
}

/// NetworkManager device states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// The device's state is unknown.
    Unknown,
    /// Device is not managed by NetworkManager.
    Unmanaged,
    /// Device is managed but not yet available (e.g., Wi-Fi disabled).
    Unavailable,
    /// Device is available but not connected.
    Disconnected,
    /// Device is preparing to connect.
    Prepare,
    /// Device is being configured.
    Config,
    /// Device needs secrets to continue.
    NeedAuth,
    /// Device is requesting IP addresses and routing information.
    IpConfig,
    /// Device is checking whether further action is required.
    IpCheck,
    /// Device is waiting for a secondary connection.
    Secondaries,
    /// Device is fully connected and operational.
    Activated,
    /// Device is disconnecting.
    Deactivating,
    /// Device connection failed.
    Failed,
    /// Unknown state code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for DeviceState {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Unknown,
            10 => Self::Unmanaged,
            20 => Self::Unavailable,
            30 => Self::Disconnected,
            40 => Self::Prepare,
            50 => Self::Config,
            60 => Self::NeedAuth,
            70 => Self::IpConfig,
            80 => Self::IpCheck,
            90 => Self::Secondaries,
            100 => Self::Activated,
            110 => Self::Deactivating,
            120 => Self::Failed,
            v => Self::Other(v),
        }
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Unmanaged => write!(f, "Unmanaged"),
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Prepare => write!(f, "Preparing"),
            Self::Config => write!(f, "Configuring"),
            Self::NeedAuth => write!(f, "NeedAuth"),
            Self::IpConfig => write!(f, "IpConfig"),
            Self::IpCheck => write!(f, "IpCheck"),
            Self::Secondaries => write!(f, "Secondaries"),
            Self::Activated => write!(f, "Activated"),
            Self::Deactivating => write!(f, "Deactivating"),
            Self::Failed => write!(f, "Failed"),
            Self::Other(v) => write!(f, "Other({v})"),
        }
    }
}

/// NetworkManager active connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveConnectionState {
    /// Connection state is unknown.
    Unknown,
    /// Connection is activating (connecting).
    Activating,
    /// Connection is fully activated (connected).
    Activated,
    /// Connection is deactivating (disconnecting).
    Deactivating,
    /// Connection is fully deactivated (disconnected).
    Deactivated,
    /// Unknown state code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for ActiveConnectionState {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::Activating,
            2 => Self::Activated,
            3 => Self::Deactivating,
            4 => Self::Deactivated,
            v => Self::Other(v),
        }
    }
}

impl Display for ActiveConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

bitflags! {
    /// Flags accepted by `Settings.Connection.Update2`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Update2Flags: u32 {
        /// Persist the connection to disk.
        const TO_DISK = 0x01;
        /// Keep the change in memory only.
        const IN_MEMORY = 0x02;
        /// Keep in memory and detach from the on-disk profile.
        const IN_MEMORY_DETACHED = 0x04;
        /// Keep in memory only, forgetting the on-disk profile.
        const IN_MEMORY_ONLY = 0x08;
        /// Delete the profile once it is deactivated.
        const VOLATILE = 0x10;
        /// Block autoconnect until the user activates it manually.
        const BLOCK_AUTOCONNECT = 0x20;
        /// Do not reapply the change to an active device.
        const NO_REAPPLY = 0x40;
    }
}

/// A signal received on a subscription.
///
/// `path` is the object that emitted the signal; `args` is the signal body
/// with one entry per argument.
#[derive(Debug, Clone)]
pub struct Event {
    /// Object that emitted the signal.
    pub path: OwnedObjectPath,
    /// Interface the signal belongs to.
    pub interface: String,
    /// Signal name, e.g. `StateChanged`.
    pub member: String,
    /// Signal arguments.
    pub args: Vec<OwnedValue>,
}

impl Event {
    /// Returns `true` if this is the given signal of the given interface.
    pub fn is(&self, interface: &str, member: &str) -> bool {
        self.interface == interface && self.member == member
    }
}

/// Errors returned by the object graph.
///
/// # Examples
///
/// ```no_run
/// use nmbind::{NetworkManager, NmError};
///
/// # async fn example() -> nmbind::Result<()> {
/// let nm = NetworkManager::new().await?;
/// for device in nm.devices().await? {
///     match device.as_ref().interface().await {
///         Ok(name) => println!("{name}"),
///         // The device went away between listing and reading; list again.
///         Err(e) if e.is_stale_reference() => continue,
///         Err(e) => return Err(e),
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Error)]
pub enum NmError {
    /// The transport failed: connection lost, malformed reply.
    #[error("D-Bus error: {0}")]
    Protocol(zbus::Error),

    /// The remote service rejected a call.
    #[error("remote call failed: {name}: {message}")]
    RemoteCall {
        /// D-Bus error name supplied by the remote side.
        name: String,
        /// Human-readable message supplied by the remote side.
        message: String,
    },

    /// The object reference no longer resolves on the remote side.
    #[error("object {path} is no longer available ({name})")]
    RemoteUnavailable {
        /// The stale object path.
        path: String,
        /// D-Bus error name the remote side reported.
        name: String,
    },

    /// A value from the bus did not have the expected representation.
    #[error("type mismatch for {member}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Property or method the value came from.
        member: String,
        /// D-Bus signature that was expected.
        expected: String,
        /// D-Bus signature that was received.
        found: String,
    },

    /// A caller-supplied string is not a valid object path.
    #[error("invalid object path: {0}")]
    InvalidPath(String),
}

impl NmError {
    /// Returns `true` if the error suggests the referenced entity may be gone.
    ///
    /// Callers seeing this should re-read the parent's object list rather
    /// than retry against the same reference.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. } | Self::RemoteCall { .. })
    }

    /// Maps a failed property read against `path` to `RemoteUnavailable` when
    /// the bus says the object, or its properties interface, does not exist.
    pub(crate) fn for_read(self, path: &str) -> Self {
        match self {
            Self::RemoteCall { name, .. }
                if name == dbus_errors::UNKNOWN_OBJECT
                    || name == dbus_errors::UNKNOWN_INTERFACE
                    || name == dbus_errors::UNKNOWN_METHOD =>
            {
                Self::RemoteUnavailable {
                    path: path.to_string(),
                    name,
                }
            }
            other => other,
        }
    }

    /// Maps a failed method call against `path` to `RemoteUnavailable` when the
    /// bus says the object does not exist.
    ///
    /// `UnknownMethod` stays a `RemoteCall` here: the object may exist but not
    /// implement the interface.
    pub(crate) fn for_call(self, path: &str) -> Self {
        match self {
            Self::RemoteCall { name, .. } if name == dbus_errors::UNKNOWN_OBJECT => {
                Self::RemoteUnavailable {
                    path: path.to_string(),
                    name,
                }
            }
            other => other,
        }
    }
}

impl From<zbus::Error> for NmError {
    fn from(e: zbus::Error) -> Self {
        match e {
            zbus::Error::MethodError(name, message, _) => Self::RemoteCall {
                name: name.as_str().to_string(),
                message: message.unwrap_or_default(),
            },
            other => Self::Protocol(other),
        }
    }
}

impl From<zvariant::Error> for NmError {
    fn from(e: zvariant::Error) -> Self {
        Self::Protocol(zbus::Error::Variant(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nm_state_from_u32() {
        assert_eq!(NmState::from(0), NmState::Unknown);
        assert_eq!(NmState::from(20), NmState::Disconnected);
        assert_eq!(NmState::from(70), NmState::ConnectedGlobal);
        assert_eq!(NmState::from(71), NmState::Other(71));
    }

    #[test]
    fn device_type_round_trips_code() {
        for code in [0, 1, 2, 5, 14, 29, 32, 13] {
            assert_eq!(DeviceType::from(code).code(), code);
        }
        assert_eq!(DeviceType::from(13), DeviceType::Other(13));
    }

    #[test]
    fn device_state_display() {
        assert_eq!(format!("{}", DeviceState::from(100)), "Activated");
        assert_eq!(format!("{}", DeviceState::from(40)), "Preparing");
        assert_eq!(format!("{}", DeviceState::from(7)), "Other(7)");
    }

    #[test]
    fn active_connection_state_display() {
        assert_eq!(format!("{}", ActiveConnectionState::from(2)), "activated");
        assert_eq!(
            format!("{}", ActiveConnectionState::from(9)),
            "unknown state (9)"
        );
    }

    #[test]
    fn update2_flags_bits() {
        let flags = Update2Flags::TO_DISK | Update2Flags::BLOCK_AUTOCONNECT;
        assert_eq!(flags.bits(), 0x21);
    }

    #[test]
    fn unknown_object_becomes_unavailable() {
        let err = NmError::RemoteCall {
            name: dbus_errors::UNKNOWN_OBJECT.into(),
            message: "no such object".into(),
        }
        .for_read("/org/freedesktop/NetworkManager/Devices/9");

        match err {
            NmError::RemoteUnavailable { path, .. } => {
                assert_eq!(path, "/org/freedesktop/NetworkManager/Devices/9")
            }
            other => panic!("expected RemoteUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn permission_denied_stays_remote_call() {
        let err = NmError::RemoteCall {
            name: "org.freedesktop.NetworkManager.PermissionDenied".into(),
            message: "not authorized".into(),
        }
        .for_read("/x");

        assert!(matches!(err, NmError::RemoteCall { .. }));
        assert!(err.is_stale_reference());
        assert_eq!(
            err.to_string(),
            "remote call failed: org.freedesktop.NetworkManager.PermissionDenied: not authorized"
        );
    }

    #[test]
    fn unknown_method_on_call_is_not_unavailable() {
        let err = NmError::RemoteCall {
            name: dbus_errors::UNKNOWN_METHOD.into(),
            message: "no such interface".into(),
        }
        .for_call("/org/freedesktop/NetworkManager/Devices/1");
        assert!(matches!(err, NmError::RemoteCall { .. }));
    }

    #[test]
    fn type_mismatch_is_not_stale() {
        let err = NmError::TypeMismatch {
            member: "Device.State".into(),
            expected: "u".into(),
            found: "s".into(),
        };
        assert!(!err.is_stale_reference());
    }
}
