//! DHCPv4 lease (`org.freedesktop.NetworkManager.DHCP4Config`).

use async_trait::async_trait;
use zvariant::OwnedObjectPath;

use crate::api::models::VariantMap;
use crate::api::render::{Render, RenderMap, RenderValue};
use crate::core::object_proxy::ObjectProxy;
use crate::types::constants::dhcp4_config;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dhcp4Config {
    proxy: ObjectProxy,
}

impl Dhcp4Config {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    /// Options received from the DHCP server, keyed by option name.
    pub async fn options(&self) -> Result<VariantMap> {
        self.proxy.property_as(dhcp4_config::OPTIONS).await
    }
}

#[async_trait]
impl Render for Dhcp4Config {
    async fn render(&self) -> Result<RenderMap> {
        let options = self
            .options()
            .await?
            .iter()
            .map(|(k, v)| (k.clone(), RenderValue::from_variant(v)))
            .collect();

        let mut map = RenderMap::new();
        map.insert("Options".into(), RenderValue::Map(options));
        Ok(map)
    }
}
