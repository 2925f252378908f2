//! Device wrappers and runtime device dispatch.

use async_trait::async_trait;
use log::debug;
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::api::models::{DeviceState, DeviceType, VariantMap};
use crate::api::render::{render_all, render_opt, Render, RenderMap};
use crate::core::object_proxy::{drop_sentinels, ObjectProxy};
use crate::objects::{AccessPoint, Connection, Dhcp4Config, Ip4Config};
use crate::types::constants::{device, device_type, wireless};
use crate::Result;

/// A network device (`org.freedesktop.NetworkManager.Device`).
///
/// Usually obtained through [`AnyDevice`], which picks the most specific
/// wrapper for the device's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    proxy: ObjectProxy,
}

impl Device {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    pub fn proxy(&self) -> &ObjectProxy {
        &self.proxy
    }

    /// Kernel or control interface name, e.g. `wlan0`.
    pub async fn interface(&self) -> Result<String> {
        self.proxy.property_as(device::INTERFACE).await
    }

    /// Interface used for IP traffic; empty when the device has no IP layer.
    pub async fn ip_interface(&self) -> Result<String> {
        self.proxy.property_as(device::IP_INTERFACE).await
    }

    pub async fn state(&self) -> Result<DeviceState> {
        let code: u32 = self.proxy.property_as(device::STATE).await?;
        Ok(code.into())
    }

    pub async fn device_type(&self) -> Result<DeviceType> {
        let code: u32 = self.proxy.property_as(device::DEVICE_TYPE).await?;
        Ok(code.into())
    }

    /// IPv4 configuration, `None` unless the device is activated.
    pub async fn ip4_config(&self) -> Result<Option<Ip4Config>> {
        let path = self.proxy.object_property(device::IP4_CONFIG).await?;
        Ok(path.map(|p| Ip4Config::new(self.proxy.sibling(p))))
    }

    /// DHCPv4 lease details, `None` when DHCP is not in use.
    pub async fn dhcp4_config(&self) -> Result<Option<Dhcp4Config>> {
        let path = self.proxy.object_property(device::DHCP4_CONFIG).await?;
        Ok(path.map(|p| Dhcp4Config::new(self.proxy.sibling(p))))
    }

    /// Saved connection profiles that could be activated on this device.
    pub async fn available_connections(&self) -> Result<Vec<Connection>> {
        let paths = self
            .proxy
            .object_list_property(device::AVAILABLE_CONNECTIONS)
            .await?;
        Ok(paths
            .into_iter()
            .map(|p| Connection::new(self.proxy.sibling(p)))
            .collect())
    }
}

#[async_trait]
impl Render for Device {
    async fn render(&self) -> Result<RenderMap> {
        let ip4 = self.ip4_config().await?;
        let dhcp4 = self.dhcp4_config().await?;
        let connections = self.available_connections().await?;

        let mut map = RenderMap::new();
        map.insert("Interface".into(), self.interface().await?.into());
        map.insert("IP interface".into(), self.ip_interface().await?.into());
        map.insert("State".into(), self.state().await?.to_string().into());
        map.insert("IP4Config".into(), render_opt(ip4.as_ref()).await?);
        map.insert("DHCP4Config".into(), render_opt(dhcp4.as_ref()).await?);
        map.insert("DeviceType".into(), self.device_type().await?.to_string().into());
        map.insert("AvailableConnections".into(), render_all(&connections).await?);
        Ok(map)
    }
}

/// A Wi-Fi device: the base [`Device`] plus access-point enumeration and
/// scanning (`org.freedesktop.NetworkManager.Device.Wireless`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirelessDevice {
    device: Device,
}

impl WirelessDevice {
    pub fn path(&self) -> &OwnedObjectPath {
        self.device.path()
    }

    /// Access points currently visible, including hidden ones.
    pub async fn access_points(&self) -> Result<Vec<AccessPoint>> {
        let proxy = self.device.proxy();
        let paths: Vec<OwnedObjectPath> = proxy.call_as(wireless::GET_ACCESS_POINTS, &[]).await?;
        Ok(drop_sentinels(wireless::GET_ACCESS_POINTS, paths)
            .into_iter()
            .map(|p| AccessPoint::new(proxy.sibling(p)))
            .collect())
    }

    /// Asks the daemon to rescan. Results show up in later
    /// [`access_points`](Self::access_points) reads.
    pub async fn request_scan(&self) -> Result<()> {
        let options = OwnedValue::from(VariantMap::new());
        self.device
            .proxy()
            .call_unit(wireless::REQUEST_SCAN, &[options])
            .await
    }
}

impl AsRef<Device> for WirelessDevice {
    fn as_ref(&self) -> &Device {
        &self.device
    }
}

#[async_trait]
impl Render for WirelessDevice {
    async fn render(&self) -> Result<RenderMap> {
        let mut map = self.device.render().await?;
        let access_points = self.access_points().await?;
        map.insert("AccessPoints".into(), render_all(&access_points).await?);
        Ok(map)
    }
}

/// A device wrapped in its most specific type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyDevice {
    Generic(Device),
    Wireless(WirelessDevice),
}

impl AnyDevice {
    /// Reads the device type behind `proxy` and wraps it accordingly.
    ///
    /// Every device the crate hands out is built here. Types without a
    /// dedicated wrapper come back as [`AnyDevice::Generic`].
    pub async fn dispatch(proxy: ObjectProxy) -> Result<Self> {
        let base = Device::new(proxy);
        let code: u32 = base.proxy().property_as(device::DEVICE_TYPE).await?;
        debug!("Device {} has type {code}", base.path());

        Ok(match code {
            device_type::WIFI => Self::Wireless(WirelessDevice { device: base }),
            _ => Self::Generic(base),
        })
    }

    /// Dispatches every path in order.
    pub(crate) async fn dispatch_all(
        origin: &ObjectProxy,
        paths: Vec<OwnedObjectPath>,
    ) -> Result<Vec<Self>> {
        let mut devices = Vec::with_capacity(paths.len());
        for path in paths {
            devices.push(Self::dispatch(origin.sibling(path)).await?);
        }
        Ok(devices)
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.as_ref().path()
    }

    pub fn as_wireless(&self) -> Option<&WirelessDevice> {
        match self {
            Self::Wireless(w) => Some(w),
            Self::Generic(_) => None,
        }
    }

    pub fn is_wireless(&self) -> bool {
        matches!(self, Self::Wireless(_))
    }
}

impl AsRef<Device> for AnyDevice {
    fn as_ref(&self) -> &Device {
        match self {
            Self::Generic(d) => d,
            Self::Wireless(w) => w.as_ref(),
        }
    }
}

#[async_trait]
impl Render for AnyDevice {
    async fn render(&self) -> Result<RenderMap> {
        match self {
            Self::Generic(d) => d.render().await,
            Self::Wireless(w) => w.render().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::NmError;
    use crate::dbus::MemoryBus;
    use std::sync::Arc;
    use zvariant::{ObjectPath, Str, Value};

    const WIFI: &str = "/org/freedesktop/NetworkManager/Devices/3";
    const ETH: &str = "/org/freedesktop/NetworkManager/Devices/2";

    fn proxy(bus: &MemoryBus, path: &str) -> ObjectProxy {
        ObjectProxy::new(
            Arc::new(bus.clone()),
            Arc::from("org.freedesktop.NetworkManager"),
            OwnedObjectPath::try_from(path).unwrap(),
        )
    }

    #[tokio::test]
    async fn wifi_code_dispatches_to_wireless() {
        let bus = MemoryBus::new();
        bus.set_property(WIFI, device::DEVICE_TYPE, OwnedValue::from(2u32));
        bus.set_property(WIFI, device::INTERFACE, OwnedValue::from(Str::from("wlan0")));

        let dev = AnyDevice::dispatch(proxy(&bus, WIFI)).await.unwrap();
        assert!(dev.is_wireless());
        assert_eq!(dev.as_ref().interface().await.unwrap(), "wlan0");
    }

    #[tokio::test]
    async fn unknown_code_dispatches_to_generic() {
        let bus = MemoryBus::new();
        bus.set_property(ETH, device::DEVICE_TYPE, OwnedValue::from(1234u32));

        let dev = AnyDevice::dispatch(proxy(&bus, ETH)).await.unwrap();
        assert!(matches!(dev, AnyDevice::Generic(_)));
        assert!(dev.as_wireless().is_none());
        assert_eq!(dev.as_ref().device_type().await.unwrap(), DeviceType::Other(1234));
    }

    #[tokio::test]
    async fn dispatch_propagates_read_failure() {
        let bus = MemoryBus::new();
        let err = AnyDevice::dispatch(proxy(&bus, ETH)).await.unwrap_err();
        assert!(matches!(err, NmError::RemoteUnavailable { .. }));
    }

    #[tokio::test]
    async fn request_scan_sends_empty_options() {
        let bus = MemoryBus::new();
        bus.set_property(WIFI, device::DEVICE_TYPE, OwnedValue::from(2u32));
        bus.on_call(WIFI, wireless::REQUEST_SCAN, |_| Ok(vec![]));

        let dev = AnyDevice::dispatch(proxy(&bus, WIFI)).await.unwrap();
        dev.as_wireless().unwrap().request_scan().await.unwrap();

        let calls = bus.calls_to(wireless::REQUEST_SCAN);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args.len(), 1);
        assert_eq!(calls[0].args[0].value_signature().to_string(), "a{sv}");
    }

    #[tokio::test]
    async fn access_points_skip_sentinel() {
        let bus = MemoryBus::new();
        bus.set_property(WIFI, device::DEVICE_TYPE, OwnedValue::from(2u32));
        bus.on_call(WIFI, wireless::GET_ACCESS_POINTS, |_| {
            let paths = vec![
                ObjectPath::from_static_str_unchecked("/org/freedesktop/NetworkManager/AccessPoint/7"),
                ObjectPath::from_static_str_unchecked("/"),
            ];
            Ok(vec![Value::from(paths).try_to_owned()?])
        });

        let dev = AnyDevice::dispatch(proxy(&bus, WIFI)).await.unwrap();
        let aps = dev.as_wireless().unwrap().access_points().await.unwrap();
        assert_eq!(aps.len(), 1);
        assert_eq!(aps[0].path().as_str(), "/org/freedesktop/NetworkManager/AccessPoint/7");
    }
}
