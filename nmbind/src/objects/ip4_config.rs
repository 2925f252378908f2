//! IPv4 configuration (`org.freedesktop.NetworkManager.IP4Config`).

use async_trait::async_trait;
use zvariant::OwnedObjectPath;

use crate::api::models::VariantMap;
use crate::api::render::{Render, RenderMap, RenderValue};
use crate::core::object_proxy::ObjectProxy;
use crate::types::constants::ip4_config;
use crate::Result;

/// Addresses, gateway and DNS servers applied to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ip4Config {
    proxy: ObjectProxy,
}

impl Ip4Config {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    /// One map per address, with at least `address` and `prefix` keys.
    pub async fn address_data(&self) -> Result<Vec<VariantMap>> {
        self.proxy.property_as(ip4_config::ADDRESS_DATA).await
    }

    /// Default gateway, empty when there is none.
    pub async fn gateway(&self) -> Result<String> {
        self.proxy.property_as(ip4_config::GATEWAY).await
    }

    /// One map per name server, with at least an `address` key.
    pub async fn nameserver_data(&self) -> Result<Vec<VariantMap>> {
        self.proxy.property_as(ip4_config::NAMESERVER_DATA).await
    }

    /// DNS search domains.
    pub async fn domains(&self) -> Result<Vec<String>> {
        self.proxy.property_as(ip4_config::DOMAINS).await
    }
}

fn render_maps(maps: &[VariantMap]) -> RenderValue {
    RenderValue::List(
        maps.iter()
            .map(|m| {
                RenderValue::Map(
                    m.iter()
                        .map(|(k, v)| (k.clone(), RenderValue::from_variant(v)))
                        .collect(),
                )
            })
            .collect(),
    )
}

#[async_trait]
impl Render for Ip4Config {
    async fn render(&self) -> Result<RenderMap> {
        let mut map = RenderMap::new();
        map.insert("Addresses".into(), render_maps(&self.address_data().await?));
        map.insert("Gateway".into(), self.gateway().await?.into());
        map.insert("Nameservers".into(), render_maps(&self.nameserver_data().await?));
        map.insert("Domains".into(), self.domains().await?.into());
        Ok(map)
    }
}
