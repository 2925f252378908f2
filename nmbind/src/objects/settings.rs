//! The settings service (`org.freedesktop.NetworkManager.Settings`).

use zvariant::OwnedObjectPath;

use crate::api::models::ConnectionSettings;
use crate::core::object_proxy::{drop_sentinels, ObjectProxy};
use crate::objects::connection::settings_arg;
use crate::objects::Connection;
use crate::types::constants::settings;
use crate::Result;

/// Store of saved connection profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    proxy: ObjectProxy,
}

impl Settings {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    /// Every saved profile.
    pub async fn list_connections(&self) -> Result<Vec<Connection>> {
        let paths: Vec<OwnedObjectPath> =
            self.proxy.call_as(settings::LIST_CONNECTIONS, &[]).await?;
        Ok(drop_sentinels(settings::LIST_CONNECTIONS, paths)
            .into_iter()
            .map(|p| Connection::new(self.proxy.sibling(p)))
            .collect())
    }

    /// Saves a new profile to disk and returns it.
    pub async fn add_connection(&self, settings: &ConnectionSettings) -> Result<Connection> {
        let path: OwnedObjectPath = self
            .proxy
            .call_as(settings::ADD_CONNECTION, &[settings_arg(settings)])
            .await?;
        Ok(Connection::new(self.proxy.sibling(path)))
    }
}
