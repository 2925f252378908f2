//! Wi-Fi access points (`org.freedesktop.NetworkManager.AccessPoint`).

use async_trait::async_trait;
use zvariant::OwnedObjectPath;

use crate::api::render::{Render, RenderMap};
use crate::core::object_proxy::ObjectProxy;
use crate::types::constants::access_point as ap;
use crate::Result;

/// An access point seen by a wireless device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    proxy: ObjectProxy,
}

impl AccessPoint {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    /// Raw SSID bytes. Empty for hidden networks.
    pub async fn ssid(&self) -> Result<Vec<u8>> {
        self.proxy.property_as(ap::SSID).await
    }

    /// SSID decoded as UTF-8, invalid sequences replaced.
    pub async fn ssid_string(&self) -> Result<String> {
        let bytes = self.ssid().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Signal quality in percent.
    pub async fn strength(&self) -> Result<u8> {
        self.proxy.property_as(ap::STRENGTH).await
    }

    /// BSSID, formatted `XX:XX:XX:XX:XX:XX`.
    pub async fn hw_address(&self) -> Result<String> {
        self.proxy.property_as(ap::HW_ADDRESS).await
    }

    /// Radio frequency in MHz.
    pub async fn frequency(&self) -> Result<u32> {
        self.proxy.property_as(ap::FREQUENCY).await
    }

    /// Maximum bitrate in kbit/s.
    pub async fn max_bitrate(&self) -> Result<u32> {
        self.proxy.property_as(ap::MAX_BITRATE).await
    }

    /// `NM80211Mode` code (1 ad-hoc, 2 infrastructure, 3 AP).
    pub async fn mode(&self) -> Result<u32> {
        self.proxy.property_as(ap::MODE).await
    }

    pub async fn flags(&self) -> Result<u32> {
        self.proxy.property_as(ap::FLAGS).await
    }

    pub async fn wpa_flags(&self) -> Result<u32> {
        self.proxy.property_as(ap::WPA_FLAGS).await
    }

    pub async fn rsn_flags(&self) -> Result<u32> {
        self.proxy.property_as(ap::RSN_FLAGS).await
    }
}

#[async_trait]
impl Render for AccessPoint {
    async fn render(&self) -> Result<RenderMap> {
        let mut map = RenderMap::new();
        map.insert("SSID".into(), self.ssid_string().await?.into());
        map.insert("Strength".into(), self.strength().await?.into());
        map.insert("HWAddress".into(), self.hw_address().await?.into());
        map.insert("Frequency".into(), self.frequency().await?.into());
        map.insert("MaxBitrate".into(), self.max_bitrate().await?.into());
        map.insert("Mode".into(), self.mode().await?.into());
        map.insert("Flags".into(), self.flags().await?.into());
        map.insert("WPAFlags".into(), self.wpa_flags().await?.into());
        map.insert("RSNFlags".into(), self.rsn_flags().await?.into());
        Ok(map)
    }
}
