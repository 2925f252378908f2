//! Saved connection profiles (`org.freedesktop.NetworkManager.Settings.Connection`).

use async_trait::async_trait;
use log::warn;
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::api::models::{ConnectionSettings, Update2Flags, VariantMap};
use crate::api::render::{Render, RenderMap, RenderValue};
use crate::core::object_proxy::ObjectProxy;
use crate::types::constants::{connection, secrets};
use crate::Result;

/// A saved connection profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    proxy: ObjectProxy,
}

impl Connection {
    pub fn new(proxy: ObjectProxy) -> Self {
        Self { proxy }
    }

    pub fn path(&self) -> &OwnedObjectPath {
        self.proxy.path()
    }

    /// Returns the profile's settings without secrets.
    ///
    /// The daemon normally omits secrets from `GetSettings` already; any
    /// secret group (`802-11-wireless-security`, `802-1x`) or VPN `secrets`
    /// key that does come back is removed before returning.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nmbind::NetworkManager;
    ///
    /// # async fn example() -> nmbind::Result<()> {
    /// let nm = NetworkManager::new().await?;
    /// for conn in nm.settings().list_connections().await? {
    ///     let settings = conn.settings().await?;
    ///     println!("{}: {:?}", conn.path(), settings.keys().collect::<Vec<_>>());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn settings(&self) -> Result<ConnectionSettings> {
        let settings: ConnectionSettings =
            self.proxy.call_as(connection::GET_SETTINGS, &[]).await?;
        Ok(strip_secrets(self.path().as_str(), settings))
    }

    /// Replaces the profile's settings and saves them to disk.
    pub async fn update(&self, settings: &ConnectionSettings) -> Result<()> {
        self.proxy
            .call_unit(connection::UPDATE, &[settings_arg(settings)])
            .await
    }

    /// Replaces the profile's settings in memory only.
    pub async fn update_unsaved(&self, settings: &ConnectionSettings) -> Result<()> {
        self.proxy
            .call_unit(connection::UPDATE_UNSAVED, &[settings_arg(settings)])
            .await
    }

    /// Replaces the profile's settings with explicit persistence flags.
    ///
    /// An empty `settings` map leaves the settings unchanged and only applies
    /// `flags`. Returns the daemon's result dictionary.
    pub async fn update2(
        &self,
        settings: &ConnectionSettings,
        flags: Update2Flags,
        args: VariantMap,
    ) -> Result<VariantMap> {
        let call_args = [
            settings_arg(settings),
            OwnedValue::from(flags.bits()),
            OwnedValue::from(args),
        ];
        self.proxy.call_as(connection::UPDATE2, &call_args).await
    }

    /// Deletes the profile.
    pub async fn delete(&self) -> Result<()> {
        self.proxy.call_unit(connection::DELETE, &[]).await
    }
}

#[async_trait]
impl Render for Connection {
    async fn render(&self) -> Result<RenderMap> {
        Ok(self
            .settings()
            .await?
            .into_iter()
            .map(|(group, keys)| {
                let rendered = keys
                    .iter()
                    .map(|(k, v)| (k.clone(), RenderValue::from_variant(v)))
                    .collect();
                (group, RenderValue::Map(rendered))
            })
            .collect())
    }
}

pub(crate) fn settings_arg(settings: &ConnectionSettings) -> OwnedValue {
    OwnedValue::from(settings.clone())
}

fn strip_secrets(path: &str, mut settings: ConnectionSettings) -> ConnectionSettings {
    for group in secrets::GROUPS {
        if settings.remove(*group).is_some() {
            warn!("Removed secret group '{group}' from settings of {path}");
        }
    }
    for (name, group) in settings.iter_mut() {
        if group.remove(secrets::VPN_SECRETS_KEY).is_some() {
            warn!("Removed '{}' from group '{name}' of {path}", secrets::VPN_SECRETS_KEY);
        }
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use zvariant::Str;

    fn group(entries: &[(&str, OwnedValue)]) -> HashMap<String, OwnedValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn strips_secret_groups_and_keys() {
        let mut settings = ConnectionSettings::new();
        settings.insert(
            "connection".into(),
            group(&[("id", OwnedValue::from(Str::from("home")))]),
        );
        settings.insert(
            "802-11-wireless-security".into(),
            group(&[("psk", OwnedValue::from(Str::from("hunter2")))]),
        );
        settings.insert(
            "802-1x".into(),
            group(&[("password", OwnedValue::from(Str::from("x")))]),
        );
        settings.insert(
            "vpn".into(),
            group(&[
                ("service-type", OwnedValue::from(Str::from("org.freedesktop.NetworkManager.openvpn"))),
                ("secrets", OwnedValue::from(HashMap::<String, String>::new())),
            ]),
        );

        let clean = strip_secrets("/p", settings);
        let mut groups: Vec<_> = clean.keys().cloned().collect();
        groups.sort();
        assert_eq!(groups, vec!["connection", "vpn"]);
        assert!(!clean["vpn"].contains_key("secrets"));
        assert!(clean["vpn"].contains_key("service-type"));
    }

    #[test]
    fn settings_argument_has_nested_signature() {
        let mut settings = ConnectionSettings::new();
        settings.insert(
            "connection".into(),
            group(&[("id", OwnedValue::from(Str::from("home")))]),
        );
        let arg = settings_arg(&settings);
        assert_eq!(arg.value_signature().to_string(), "a{sa{sv}}");
    }
}
