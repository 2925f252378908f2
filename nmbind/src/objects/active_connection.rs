//! Active connections (`org.freedesktop.NetworkManager.Connection.Active`).

use async_trait::async_trait;
use zvariant::OwnedObjectPath;

use crate::api::models::ActiveConnectionState;
use crate::api::render::{render_opt, Render, RenderMap, RenderValue};
use crate::core::object_proxy::ObjectProxy;
use crate::objects::{AccessPoint, AnyDevice, Connection, Dhcp4Config, Ip4Config};
use crate::types::constants::active_connection as ac;
use crate::Result;

/// A profile currently applied to one or more devices.
///
/// Active connections are short-lived on the daemon side: once deactivated
/// the object disappears and reads fail with
/// [`NmError::RemoteUnavailable`](crate::NmError::RemoteUnavailable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveConnection {
    proxy: ObjectProxy,
}

impl ActiveConnection {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    /// The saved profile this activation was made from.
    ///
    /// `None` when the daemon reports no profile (the `/` path).
    pub async fn connection(&self) -> Result<Option<Connection>> {
        let path = self.proxy.object_property(ac::CONNECTION).await?;
        Ok(path.map(|p| Connection::new(self.proxy.sibling(p))))
    }

    /// The access point used, for Wi-Fi activations.
    pub async fn specific_object(&self) -> Result<Option<AccessPoint>> {
        let path = self.proxy.object_property(ac::SPECIFIC_OBJECT).await?;
        Ok(path.map(|p| AccessPoint::new(self.proxy.sibling(p))))
    }

    pub async fn id(&self) -> Result<String> {
        self.proxy.property_as(ac::ID).await
    }

    pub async fn uuid(&self) -> Result<String> {
        self.proxy.property_as(ac::UUID).await
    }

    /// Setting type of the profile, e.g. `802-11-wireless`.
    pub async fn connection_type(&self) -> Result<String> {
        self.proxy.property_as(ac::TYPE).await
    }

    pub async fn devices(&self) -> Result<Vec<AnyDevice>> {
        let paths = self.proxy.object_list_property(ac::DEVICES).await?;
        AnyDevice::dispatch_all(&self.proxy, paths).await
    }

    pub async fn state(&self) -> Result<ActiveConnectionState> {
        let code: u32 = self.proxy.property_as(ac::STATE).await?;
        Ok(code.into())
    }

    /// Raw `NMActivationStateFlags` bits.
    pub async fn state_flags(&self) -> Result<u32> {
        self.proxy.property_as(ac::STATE_FLAGS).await
    }

    /// Whether this connection owns the default IPv4 route.
    pub async fn default(&self) -> Result<bool> {
        self.proxy.property_as(ac::DEFAULT).await
    }

    /// Whether this connection owns the default IPv6 route.
    pub async fn default6(&self) -> Result<bool> {
        self.proxy.property_as(ac::DEFAULT6).await
    }

    pub async fn ip4_config(&self) -> Result<Option<Ip4Config>> {
        let path = self.proxy.object_property(ac::IP4_CONFIG).await?;
        Ok(path.map(|p| Ip4Config::new(self.proxy.sibling(p))))
    }

    pub async fn dhcp4_config(&self) -> Result<Option<Dhcp4Config>> {
        let path = self.proxy.object_property(ac::DHCP4_CONFIG).await?;
        Ok(path.map(|p| Dhcp4Config::new(self.proxy.sibling(p))))
    }

    pub async fn vpn(&self) -> Result<bool> {
        self.proxy.property_as(ac::VPN).await
    }

    /// Controller device for a port connection (bond, bridge member).
    pub async fn master(&self) -> Result<Option<AnyDevice>> {
        match self.proxy.object_property(ac::MASTER).await? {
            Some(path) => Ok(Some(AnyDevice::dispatch(self.proxy.sibling(path)).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Render for ActiveConnection {
    async fn render(&self) -> Result<RenderMap> {
        let specific = self.specific_object().await?;
        let devices: Vec<String> = self
            .devices()
            .await?
            .iter()
            .map(|d| d.path().to_string())
            .collect();

        let mut map = RenderMap::new();
        map.insert("Id".into(), self.id().await?.into());
        map.insert("Uuid".into(), self.uuid().await?.into());
        map.insert("Type".into(), self.connection_type().await?.into());
        map.insert("State".into(), self.state().await?.to_string().into());
        map.insert("Default".into(), self.default().await?.into());
        map.insert("Default6".into(), self.default6().await?.into());
        map.insert("Vpn".into(), self.vpn().await?.into());
        map.insert("Devices".into(), RenderValue::from(devices));
        map.insert("SpecificObject".into(), render_opt(specific.as_ref()).await?);
        Ok(map)
    }
}
