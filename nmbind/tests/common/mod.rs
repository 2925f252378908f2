//! A small NetworkManager object graph served from a `MemoryBus`.
//!
//! Layout:
//! - Devices/1 `eth0` (ethernet), activated, with IP4Config/1 and DHCP4Config/1
//! - Devices/2 `wlan0` (wifi), two access points
//! - Devices/3 `lo` (loopback)
//! - Settings/1 "home" (wifi profile, daemon leaks its security group)
//! - Settings/2 "wired" (ethernet profile)
//! - ActiveConnection/1 "wired" on Devices/1

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use nmbind::types::constants::{
    access_point, active_connection, connection, device, dhcp4_config, ip4_config, nm, service,
    settings, wireless,
};
use nmbind::{ClientConfig, Event, MemoryBus, NetworkManager};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Str, Value};

pub const ETH: &str = "/org/freedesktop/NetworkManager/Devices/1";
pub const WLAN: &str = "/org/freedesktop/NetworkManager/Devices/2";
pub const LO: &str = "/org/freedesktop/NetworkManager/Devices/3";
pub const AP_HOME: &str = "/org/freedesktop/NetworkManager/AccessPoint/10";
pub const AP_CAFE: &str = "/org/freedesktop/NetworkManager/AccessPoint/11";
pub const CONN_HOME: &str = "/org/freedesktop/NetworkManager/Settings/1";
pub const CONN_WIRED: &str = "/org/freedesktop/NetworkManager/Settings/2";
pub const ACTIVE_WIRED: &str = "/org/freedesktop/NetworkManager/ActiveConnection/1";
pub const IP4: &str = "/org/freedesktop/NetworkManager/IP4Config/1";
pub const DHCP4: &str = "/org/freedesktop/NetworkManager/DHCP4Config/1";

pub fn text(s: &str) -> OwnedValue {
    OwnedValue::from(Str::from(s))
}

pub fn path(p: &str) -> OwnedValue {
    OwnedValue::from(ObjectPath::try_from(p).unwrap())
}

pub fn paths(ps: &[&str]) -> OwnedValue {
    let list: Vec<ObjectPath<'_>> = ps.iter().map(|p| ObjectPath::try_from(*p).unwrap()).collect();
    Value::from(list).try_to_owned().unwrap()
}

pub fn owned(value: Value<'_>) -> OwnedValue {
    value.try_to_owned().unwrap()
}

pub fn event(path: &str, interface: &str, member: &str, code: u32) -> Event {
    Event {
        path: OwnedObjectPath::try_from(path).unwrap(),
        interface: interface.to_string(),
        member: member.to_string(),
        args: vec![OwnedValue::from(code)],
    }
}

fn home_settings() -> OwnedValue {
    let mut conn = HashMap::new();
    conn.insert("id", Value::from("home"));
    conn.insert("uuid", Value::from("5f1c2c4e-1d7a-4f0e-9f5b-3c1a2b7d9e01"));
    conn.insert("type", Value::from("802-11-wireless"));

    let mut wifi = HashMap::new();
    wifi.insert("ssid", Value::from(b"home".to_vec()));
    wifi.insert("mode", Value::from("infrastructure"));

    let mut security = HashMap::new();
    security.insert("key-mgmt", Value::from("wpa-psk"));
    security.insert("psk", Value::from("correct horse battery staple"));

    let mut groups = HashMap::new();
    groups.insert("connection", conn);
    groups.insert("802-11-wireless", wifi);
    groups.insert("802-11-wireless-security", security);
    owned(Value::from(groups))
}

fn wired_settings() -> OwnedValue {
    let mut conn = HashMap::new();
    conn.insert("id", Value::from("wired"));
    conn.insert("type", Value::from("802-3-ethernet"));

    let mut groups = HashMap::new();
    groups.insert("connection", conn);
    owned(Value::from(groups))
}

fn address_data() -> OwnedValue {
    let mut addr = HashMap::new();
    addr.insert("address", Value::from("192.168.1.20"));
    addr.insert("prefix", Value::from(24u32));
    owned(Value::from(vec![addr]))
}

fn nameserver_data() -> OwnedValue {
    let mut ns = HashMap::new();
    ns.insert("address", Value::from("192.168.1.1"));
    owned(Value::from(vec![ns]))
}

fn dhcp_options() -> OwnedValue {
    let mut options = HashMap::new();
    options.insert("ip_address", Value::from("192.168.1.20"));
    options.insert("dhcp_lease_time", Value::from("86400"));
    owned(Value::from(options))
}

fn add_device(bus: &MemoryBus, at: &str, iface: &str, kind: u32, state: u32) {
    bus.set_property(at, device::INTERFACE, text(iface));
    bus.set_property(at, device::IP_INTERFACE, text(iface));
    bus.set_property(at, device::DEVICE_TYPE, OwnedValue::from(kind));
    bus.set_property(at, device::STATE, OwnedValue::from(state));
    bus.set_property(at, device::IP4_CONFIG, path("/"));
    bus.set_property(at, device::DHCP4_CONFIG, path("/"));
    bus.set_property(at, device::AVAILABLE_CONNECTIONS, paths(&[]));
}

fn add_access_point(bus: &MemoryBus, at: &str, ssid: &[u8], strength: u8, freq: u32) {
    bus.set_property(at, access_point::SSID, owned(Value::from(ssid.to_vec())));
    bus.set_property(at, access_point::STRENGTH, OwnedValue::from(strength));
    bus.set_property(at, access_point::HW_ADDRESS, text("AA:BB:CC:DD:EE:FF"));
    bus.set_property(at, access_point::FREQUENCY, OwnedValue::from(freq));
    bus.set_property(at, access_point::MAX_BITRATE, OwnedValue::from(270_000u32));
    bus.set_property(at, access_point::MODE, OwnedValue::from(2u32));
    bus.set_property(at, access_point::FLAGS, OwnedValue::from(1u32));
    bus.set_property(at, access_point::WPA_FLAGS, OwnedValue::from(0u32));
    bus.set_property(at, access_point::RSN_FLAGS, OwnedValue::from(0x188u32));
}

/// Builds the fixture graph.
pub fn fake_network() -> MemoryBus {
    let bus = MemoryBus::new();

    bus.set_property(service::ROOT_PATH, nm::STATE, OwnedValue::from(70u32));
    bus.set_property(service::ROOT_PATH, nm::ACTIVE_CONNECTIONS, paths(&[ACTIVE_WIRED]));
    bus.on_call(service::ROOT_PATH, nm::GET_DEVICES, |_| {
        Ok(vec![paths(&[ETH, WLAN, LO])])
    });

    add_device(&bus, ETH, "eth0", 1, 100);
    bus.set_property(ETH, device::IP4_CONFIG, path(IP4));
    bus.set_property(ETH, device::DHCP4_CONFIG, path(DHCP4));
    bus.set_property(ETH, device::AVAILABLE_CONNECTIONS, paths(&[CONN_WIRED]));

    add_device(&bus, WLAN, "wlan0", 2, 30);
    bus.set_property(WLAN, device::AVAILABLE_CONNECTIONS, paths(&[CONN_HOME]));
    bus.on_call(WLAN, wireless::GET_ACCESS_POINTS, |_| {
        Ok(vec![paths(&[AP_HOME, AP_CAFE])])
    });
    bus.on_call(WLAN, wireless::REQUEST_SCAN, |_| Ok(vec![]));
    add_access_point(&bus, AP_HOME, b"home", 82, 5180);
    add_access_point(&bus, AP_CAFE, b"cafe", 40, 2437);

    add_device(&bus, LO, "lo", 32, 100);

    bus.set_property(IP4, ip4_config::ADDRESS_DATA, address_data());
    bus.set_property(IP4, ip4_config::GATEWAY, text("192.168.1.1"));
    bus.set_property(IP4, ip4_config::NAMESERVER_DATA, nameserver_data());
    bus.set_property(
        IP4,
        ip4_config::DOMAINS,
        owned(Value::from(vec!["lan".to_string()])),
    );
    bus.set_property(DHCP4, dhcp4_config::OPTIONS, dhcp_options());

    bus.on_call(service::SETTINGS_PATH, settings::LIST_CONNECTIONS, |_| {
        Ok(vec![paths(&[CONN_HOME, CONN_WIRED])])
    });
    bus.on_call(CONN_HOME, connection::GET_SETTINGS, |_| Ok(vec![home_settings()]));
    bus.on_call(CONN_WIRED, connection::GET_SETTINGS, |_| Ok(vec![wired_settings()]));

    bus.set_property(ACTIVE_WIRED, active_connection::CONNECTION, path(CONN_WIRED));
    bus.set_property(ACTIVE_WIRED, active_connection::SPECIFIC_OBJECT, path("/"));
    bus.set_property(ACTIVE_WIRED, active_connection::ID, text("wired"));
    bus.set_property(
        ACTIVE_WIRED,
        active_connection::UUID,
        text("0b7e9a43-51c2-4c7a-8d6e-2f3b1a9c8d77"),
    );
    bus.set_property(ACTIVE_WIRED, active_connection::TYPE, text("802-3-ethernet"));
    bus.set_property(ACTIVE_WIRED, active_connection::DEVICES, paths(&[ETH]));
    bus.set_property(ACTIVE_WIRED, active_connection::STATE, OwnedValue::from(2u32));
    bus.set_property(ACTIVE_WIRED, active_connection::STATE_FLAGS, OwnedValue::from(0x5u32));
    bus.set_property(ACTIVE_WIRED, active_connection::DEFAULT, OwnedValue::from(true));
    bus.set_property(ACTIVE_WIRED, active_connection::DEFAULT6, OwnedValue::from(false));
    bus.set_property(ACTIVE_WIRED, active_connection::IP4_CONFIG, path(IP4));
    bus.set_property(ACTIVE_WIRED, active_connection::DHCP4_CONFIG, path(DHCP4));
    bus.set_property(ACTIVE_WIRED, active_connection::VPN, OwnedValue::from(false));
    bus.set_property(ACTIVE_WIRED, active_connection::MASTER, path("/"));

    bus
}

pub fn client(bus: &MemoryBus) -> NetworkManager {
    client_with(bus, ClientConfig::default())
}

pub fn client_with(bus: &MemoryBus, config: ClientConfig) -> NetworkManager {
    NetworkManager::with_transport(Arc::new(bus.clone()), config).unwrap()
}
