//! Constants for the NetworkManager D-Bus schema.
//!
//! Interface names, member names, well-known paths and the numeric codes
//! NetworkManager publishes. Nothing in here is computed; these mirror the
//! daemon's documented D-Bus API.

/// A property or method name qualified by the interface that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Member {
    /// Fully qualified D-Bus interface name.
    pub interface: &'static str,
    /// Member name within that interface.
    pub name: &'static str,
}

impl Member {
    pub const fn new(interface: &'static str, name: &'static str) -> Self {
        Self { interface, name }
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.interface, self.name)
    }
}

/// Bus name and well-known object paths.
pub mod service {
    pub const NAME: &str = "org.freedesktop.NetworkManager";
    pub const ROOT_PATH: &str = "/org/freedesktop/NetworkManager";
    pub const SETTINGS_PATH: &str = "/org/freedesktop/NetworkManager/Settings";
    /// Sentinel path NetworkManager uses for "no object".
    pub const NO_OBJECT: &str = "/";
}

/// D-Bus interface names.
pub mod interface {
    pub const PROPERTIES: &str = "org.freedesktop.DBus.Properties";
    pub const NETWORK_MANAGER: &str = "org.freedesktop.NetworkManager";
    pub const DEVICE: &str = "org.freedesktop.NetworkManager.Device";
    pub const WIRELESS: &str = "org.freedesktop.NetworkManager.Device.Wireless";
    pub const ACCESS_POINT: &str = "org.freedesktop.NetworkManager.AccessPoint";
    pub const ACTIVE_CONNECTION: &str = "org.freedesktop.NetworkManager.Connection.Active";
    pub const SETTINGS: &str = "org.freedesktop.NetworkManager.Settings";
    pub const CONNECTION: &str = "org.freedesktop.NetworkManager.Settings.Connection";
    pub const IP4_CONFIG: &str = "org.freedesktop.NetworkManager.IP4Config";
    pub const DHCP4_CONFIG: &str = "org.freedesktop.NetworkManager.DHCP4Config";
}

/// Members of `org.freedesktop.NetworkManager`.
pub mod nm {
    use super::{interface::NETWORK_MANAGER as I, Member};

    pub const GET_DEVICES: Member = Member::new(I, "GetDevices");
    pub const ACTIVATE_CONNECTION: Member = Member::new(I, "ActivateConnection");
    pub const DEACTIVATE_CONNECTION: Member = Member::new(I, "DeactivateConnection");
    pub const STATE: Member = Member::new(I, "State");
    pub const ACTIVE_CONNECTIONS: Member = Member::new(I, "ActiveConnections");
}

/// Members of `org.freedesktop.NetworkManager.Device`.
pub mod device {
    use super::{interface::DEVICE as I, Member};

    pub const INTERFACE: Member = Member::new(I, "Interface");
    pub const IP_INTERFACE: Member = Member::new(I, "IpInterface");
    pub const STATE: Member = Member::new(I, "State");
    pub const IP4_CONFIG: Member = Member::new(I, "Ip4Config");
    pub const DHCP4_CONFIG: Member = Member::new(I, "Dhcp4Config");
    pub const DEVICE_TYPE: Member = Member::new(I, "DeviceType");
    pub const AVAILABLE_CONNECTIONS: Member = Member::new(I, "AvailableConnections");
}

/// Members of `org.freedesktop.NetworkManager.Device.Wireless`.
pub mod wireless {
    use super::{interface::WIRELESS as I, Member};

    pub const GET_ACCESS_POINTS: Member = Member::new(I, "GetAccessPoints");
    pub const REQUEST_SCAN: Member = Member::new(I, "RequestScan");
}

/// Members of `org.freedesktop.NetworkManager.AccessPoint`.
pub mod access_point {
    use super::{interface::ACCESS_POINT as I, Member};

    pub const SSID: Member = Member::new(I, "Ssid");
    pub const STRENGTH: Member = Member::new(I, "Strength");
    pub const HW_ADDRESS: Member = Member::new(I, "HwAddress");
    pub const FREQUENCY: Member = Member::new(I, "Frequency");
    pub const MAX_BITRATE: Member = Member::new(I, "MaxBitrate");
    pub const MODE: Member = Member::new(I, "Mode");
    pub const FLAGS: Member = Member::new(I, "Flags");
    pub const WPA_FLAGS: Member = Member::new(I, "WpaFlags");
    pub const RSN_FLAGS: Member = Member::new(I, "RsnFlags");
}

/// Members of `org.freedesktop.NetworkManager.Connection.Active`.
pub mod active_connection {
    use super::{interface::ACTIVE_CONNECTION as I, Member};

    pub const CONNECTION: Member = Member::new(I, "Connection");
    pub const SPECIFIC_OBJECT: Member = Member::new(I, "SpecificObject");
    pub const ID: Member = Member::new(I, "Id");
    pub const UUID: Member = Member::new(I, "Uuid");
    pub const TYPE: Member = Member::new(I, "Type");
    pub const DEVICES: Member = Member::new(I, "Devices");
    pub const STATE: Member = Member::new(I, "State");
    pub const STATE_FLAGS: Member = Member::new(I, "StateFlags");
    pub const DEFAULT: Member = Member::new(I, "Default");
    pub const DEFAULT6: Member = Member::new(I, "Default6");
    pub const IP4_CONFIG: Member = Member::new(I, "Ip4Config");
    pub const DHCP4_CONFIG: Member = Member::new(I, "Dhcp4Config");
    pub const VPN: Member = Member::new(I, "Vpn");
    pub const MASTER: Member = Member::new(I, "Master");
}

/// Members of `org.freedesktop.NetworkManager.Settings`.
pub mod settings {
    use super::{interface::SETTINGS as I, Member};

    pub const LIST_CONNECTIONS: Member = Member::new(I, "ListConnections");
    pub const ADD_CONNECTION: Member = Member::new(I, "AddConnection");
}

/// Members of `org.freedesktop.NetworkManager.Settings.Connection`.
pub mod connection {
    use super::{interface::CONNECTION as I, Member};

    pub const GET_SETTINGS: Member = Member::new(I, "GetSettings");
    pub const UPDATE: Member = Member::new(I, "Update");
    pub const UPDATE_UNSAVED: Member = Member::new(I, "UpdateUnsaved");
    pub const UPDATE2: Member = Member::new(I, "Update2");
    pub const DELETE: Member = Member::new(I, "Delete");
}

/// Members of `org.freedesktop.NetworkManager.IP4Config`.
pub mod ip4_config {
    use super::{interface::IP4_CONFIG as I, Member};

    pub const ADDRESS_DATA: Member = Member::new(I, "AddressData");
    pub const GATEWAY: Member = Member::new(I, "Gateway");
    pub const NAMESERVER_DATA: Member = Member::new(I, "NameserverData");
    pub const DOMAINS: Member = Member::new(I, "Domains");
}

/// Members of `org.freedesktop.NetworkManager.DHCP4Config`.
pub mod dhcp4_config {
    use super::{interface::DHCP4_CONFIG as I, Member};

    pub const OPTIONS: Member = Member::new(I, "Options");
}

/// NetworkManager device type constants.
pub mod device_type {
    pub const UNKNOWN: u32 = 0;
    pub const ETHERNET: u32 = 1;
    pub const WIFI: u32 = 2;
    pub const BLUETOOTH: u32 = 5;
    pub const GENERIC: u32 = 14;
    pub const WIREGUARD: u32 = 29;
    pub const LOOPBACK: u32 = 32;
}

/// Setting groups that carry secrets and are stripped from general settings reads.
pub mod secrets {
    pub const GROUPS: &[&str] = &["802-11-wireless-security", "802-1x"];
    /// Per-group key holding VPN plugin secrets.
    pub const VPN_SECRETS_KEY: &str = "secrets";
}

/// Error names the bus reports when an object reference no longer resolves.
pub mod dbus_errors {
    pub const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";
    pub const UNKNOWN_INTERFACE: &str = "org.freedesktop.DBus.Error.UnknownInterface";
    pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
    pub const UNKNOWN_PROPERTY: &str = "org.freedesktop.DBus.Error.UnknownProperty";
}

/// Defaults for [`ClientConfig`](crate::ClientConfig).
pub mod defaults {
    /// Notifications buffered per subscription before new ones are dropped.
    pub const EVENT_QUEUE_CAPACITY: usize = 10;
}
