//! A canned network for trying the CLI without NetworkManager.

use std::collections::HashMap;

use nmbind::MemoryBus;
use nmbind::types::constants::{
    access_point, active_connection, connection, device, nm, service, settings, wireless,
};
use zvariant::{ObjectPath, OwnedValue, Str, Value};

const ETH: &str = "/org/freedesktop/NetworkManager/Devices/1";
const WLAN: &str = "/org/freedesktop/NetworkManager/Devices/2";
const AP: &str = "/org/freedesktop/NetworkManager/AccessPoint/1";
const PROFILE: &str = "/org/freedesktop/NetworkManager/Settings/1";
const ACTIVE: &str = "/org/freedesktop/NetworkManager/ActiveConnection/1";

fn text(s: &str) -> OwnedValue {
    OwnedValue::from(Str::from(s))
}

fn path(p: &'static str) -> OwnedValue {
    OwnedValue::from(ObjectPath::from_str_unchecked(p))
}

fn paths(ps: &[&'static str]) -> nmbind::Result<OwnedValue> {
    let list: Vec<ObjectPath<'static>> = ps
        .iter()
        .map(|p| ObjectPath::from_str_unchecked(p))
        .collect();
    Ok(Value::from(list).try_to_owned()?)
}

fn profile_settings() -> nmbind::Result<OwnedValue> {
    let mut conn = HashMap::new();
    conn.insert("id", Value::from("Wired connection 1"));
    conn.insert("type", Value::from("802-3-ethernet"));
    conn.insert("autoconnect", Value::from(true));

    let mut groups = HashMap::new();
    groups.insert("connection", conn);
    Ok(Value::from(groups).try_to_owned()?)
}

fn add_device(bus: &MemoryBus, at: &str, iface: &str, kind: u32, state: u32) -> nmbind::Result<()> {
    bus.set_property(at, device::INTERFACE, text(iface));
    bus.set_property(at, device::IP_INTERFACE, text(iface));
    bus.set_property(at, device::DEVICE_TYPE, OwnedValue::from(kind));
    bus.set_property(at, device::STATE, OwnedValue::from(state));
    bus.set_property(at, device::IP4_CONFIG, path("/"));
    bus.set_property(at, device::DHCP4_CONFIG, path("/"));
    bus.set_property(at, device::AVAILABLE_CONNECTIONS, paths(&[])?);
    Ok(())
}

fn build() -> nmbind::Result<MemoryBus> {
    let bus = MemoryBus::new();

    bus.set_property(service::ROOT_PATH, nm::STATE, OwnedValue::from(70u32));
    bus.set_property(service::ROOT_PATH, nm::ACTIVE_CONNECTIONS, paths(&[ACTIVE])?);
    bus.on_call(service::ROOT_PATH, nm::GET_DEVICES, |_| Ok(vec![paths(&[ETH, WLAN])?]));

    add_device(&bus, ETH, "enp3s0", 1, 100)?;
    bus.set_property(ETH, device::AVAILABLE_CONNECTIONS, paths(&[PROFILE])?);

    add_device(&bus, WLAN, "wlp2s0", 2, 30)?;
    bus.on_call(WLAN, wireless::GET_ACCESS_POINTS, |_| Ok(vec![paths(&[AP])?]));
    bus.on_call(WLAN, wireless::REQUEST_SCAN, |_| Ok(vec![]));

    bus.set_property(AP, access_point::SSID, Value::from(b"demo-net".to_vec()).try_to_owned()?);
    bus.set_property(AP, access_point::STRENGTH, OwnedValue::from(67u8));
    bus.set_property(AP, access_point::HW_ADDRESS, text("02:00:00:00:00:01"));
    bus.set_property(AP, access_point::FREQUENCY, OwnedValue::from(2412u32));
    bus.set_property(AP, access_point::MAX_BITRATE, OwnedValue::from(54_000u32));
    bus.set_property(AP, access_point::MODE, OwnedValue::from(2u32));
    bus.set_property(AP, access_point::FLAGS, OwnedValue::from(1u32));
    bus.set_property(AP, access_point::WPA_FLAGS, OwnedValue::from(0u32));
    bus.set_property(AP, access_point::RSN_FLAGS, OwnedValue::from(0x188u32));

    bus.on_call(service::SETTINGS_PATH, settings::LIST_CONNECTIONS, |_| {
        Ok(vec![paths(&[PROFILE])?])
    });
    bus.on_call(PROFILE, connection::GET_SETTINGS, |_| Ok(vec![profile_settings()?]));

    bus.set_property(ACTIVE, active_connection::CONNECTION, path(PROFILE));
    bus.set_property(ACTIVE, active_connection::ID, text("Wired connection 1"));
    bus.set_property(ACTIVE, active_connection::DEVICES, paths(&[ETH])?);
    bus.set_property(ACTIVE, active_connection::STATE, OwnedValue::from(2u32));

    Ok(bus)
}

/// The demo network. Falls back to an empty bus if a value fails to encode.
pub fn network() -> MemoryBus {
    build().unwrap_or_else(|e| {
        log::warn!("Demo network incomplete: {e}");
        MemoryBus::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use nmbind::{ClientConfig, NetworkManager, NmState};

    #[tokio::test]
    async fn demo_graph_is_walkable() {
        let nm = NetworkManager::with_transport(Arc::new(build().unwrap()), ClientConfig::default())
            .unwrap();
        assert_eq!(nm.state().await.unwrap(), NmState::ConnectedGlobal);

        let devices = nm.devices().await.unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices[1].is_wireless());

        let connections = nm.settings().list_connections().await.unwrap();
        assert_eq!(connections.len(), 1);
    }
}
