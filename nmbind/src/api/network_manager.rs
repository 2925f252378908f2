use std::sync::Arc;

use async_trait::async_trait;
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::api::config::ClientConfig;
use crate::api::models::{NmError, NmState};
use crate::api::render::{render_all, Render, RenderMap};
use crate::core::object_proxy::{drop_sentinels, ObjectProxy};
use crate::core::subscription::{EventStream, SubscriptionSlot};
use crate::dbus::{DbusTransport, Transport};
use crate::objects::{AccessPoint, ActiveConnection, AnyDevice, Connection, Settings, WirelessDevice};
use crate::types::constants::{nm, service};
use crate::Result;

/// Entry point into the NetworkManager object graph.
///
/// Everything else is reached from here: devices, saved profiles, active
/// connections. Nothing is loaded up front; each accessor performs the remote
/// reads it needs when called.
///
/// # Creating an Instance
///
/// ```no_run
/// use nmbind::NetworkManager;
///
/// # async fn example() -> nmbind::Result<()> {
/// let nm = NetworkManager::new().await?;
/// println!("state: {}", nm.state().await?);
/// # Ok(())
/// # }
/// ```
///
/// # Examples
///
/// ## Walking devices
///
/// ```no_run
/// use nmbind::{AnyDevice, NetworkManager};
///
/// # async fn example() -> nmbind::Result<()> {
/// let nm = NetworkManager::new().await?;
/// for device in nm.devices().await? {
///     let base = device.as_ref();
///     println!("{} ({})", base.interface().await?, base.device_type().await?);
///
///     if let AnyDevice::Wireless(wifi) = &device {
///         for ap in wifi.access_points().await? {
///             println!("  {} {}%", ap.ssid_string().await?, ap.strength().await?);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Watching for changes
///
/// ```no_run
/// use nmbind::NetworkManager;
///
/// # async fn example() -> nmbind::Result<()> {
/// let nm = NetworkManager::new().await?;
/// let events = nm.subscribe().await?;
/// while let Some(event) = events.recv().await {
///     println!("{} {}.{}", event.path, event.interface, event.member);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// `NetworkManager` is `Clone` and can be shared across tasks. Clones share
/// the transport and the subscription; independently constructed instances
/// do not share a subscription.
#[derive(Clone)]
pub struct NetworkManager {
    proxy: ObjectProxy,
    settings_path: OwnedObjectPath,
    config: ClientConfig,
    subscription: SubscriptionSlot,
}

impl std::fmt::Debug for NetworkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkManager")
            .field("proxy", &self.proxy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NetworkManager {
    /// Connects to the system bus with default settings.
    pub async fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default()).await
    }

    /// Connects to the system bus with custom settings.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nmbind::{ClientConfig, NetworkManager};
    ///
    /// # async fn example() -> nmbind::Result<()> {
    /// let config = ClientConfig::new().with_event_capacity(64);
    /// let nm = NetworkManager::with_config(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = DbusTransport::system().await?;
        Self::build(Arc::new(transport), config)
    }

    /// Uses an existing zbus connection, e.g. a session or private bus.
    pub fn with_connection(conn: zbus::Connection, config: ClientConfig) -> Result<Self> {
        Self::build(Arc::new(DbusTransport::new(conn)), config)
    }

    /// Builds the entry object over any [`Transport`].
    ///
    /// Fails with [`NmError::InvalidPath`] when the configured root path is
    /// not a valid object path.
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        Self::build(transport, config)
    }

    fn build(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        let root = parse_path(&config.root_path)?;
        let settings_path = match root.as_str() {
            "/" => parse_path("/Settings")?,
            r => parse_path(&format!("{r}/Settings"))?,
        };
        let proxy = ObjectProxy::new(transport, Arc::from(config.service.as_str()), root);
        Ok(Self {
            proxy,
            settings_path,
            config,
            subscription: SubscriptionSlot::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Wraps a caller-supplied path as a [`Connection`].
    pub fn connection(&self, path: &str) -> Result<Connection> {
        Ok(Connection::new(self.proxy.sibling(parse_path(path)?)))
    }

    /// Wraps a caller-supplied path as a device, reading its type.
    pub async fn device(&self, path: &str) -> Result<AnyDevice> {
        AnyDevice::dispatch(self.proxy.sibling(parse_path(path)?)).await
    }

    /// All devices known to NetworkManager, each in its most specific wrapper.
    pub async fn devices(&self) -> Result<Vec<AnyDevice>> {
        let paths: Vec<OwnedObjectPath> = self.proxy.call_as(nm::GET_DEVICES, &[]).await?;
        let paths = drop_sentinels(nm::GET_DEVICES, paths);
        AnyDevice::dispatch_all(&self.proxy, paths).await
    }

    /// Overall networking state.
    pub async fn state(&self) -> Result<NmState> {
        let code: u32 = self.proxy.property_as(nm::STATE).await?;
        Ok(code.into())
    }

    pub async fn active_connections(&self) -> Result<Vec<ActiveConnection>> {
        let paths = self.proxy.object_list_property(nm::ACTIVE_CONNECTIONS).await?;
        Ok(paths
            .into_iter()
            .map(|p| ActiveConnection::new(self.proxy.sibling(p)))
            .collect())
    }

    /// Activates `connection` on `device`.
    ///
    /// `specific_object` narrows the activation, e.g. to one access point;
    /// `None` lets NetworkManager choose. Returns the active connection the
    /// daemon created.
    pub async fn activate_connection(
        &self,
        connection: &Connection,
        device: &AnyDevice,
        specific_object: Option<&OwnedObjectPath>,
    ) -> Result<ActiveConnection> {
        let no_object = parse_path(service::NO_OBJECT)?;
        let args = [
            path_arg(connection.path()),
            path_arg(device.path()),
            path_arg(specific_object.unwrap_or(&no_object)),
        ];
        let active: OwnedObjectPath = self.proxy.call_as(nm::ACTIVATE_CONNECTION, &args).await?;
        Ok(ActiveConnection::new(self.proxy.sibling(active)))
    }

    /// Activates `connection` on a Wi-Fi device using a specific access point.
    pub async fn activate_wireless_connection(
        &self,
        connection: &Connection,
        device: &WirelessDevice,
        access_point: &AccessPoint,
    ) -> Result<ActiveConnection> {
        let args = [
            path_arg(connection.path()),
            path_arg(device.path()),
            path_arg(access_point.path()),
        ];
        let active: OwnedObjectPath = self.proxy.call_as(nm::ACTIVATE_CONNECTION, &args).await?;
        Ok(ActiveConnection::new(self.proxy.sibling(active)))
    }

    pub async fn deactivate_connection(&self, active: &ActiveConnection) -> Result<()> {
        self.proxy
            .call_unit(nm::DEACTIVATE_CONNECTION, &[path_arg(active.path())])
            .await
    }

    /// The settings service on the same bus.
    pub fn settings(&self) -> Settings {
        Settings::new(self.proxy.sibling(self.settings_path.clone()))
    }

    /// Starts receiving signals for every object under the root path.
    ///
    /// Calling this while already subscribed returns the existing channel.
    /// At most [`ClientConfig::event_capacity`] events are buffered; newer
    /// events are dropped while the buffer is full and counted in
    /// [`EventStream::dropped`].
    pub async fn subscribe(&self) -> Result<EventStream> {
        self.subscription
            .subscribe(
                self.proxy.transport(),
                self.proxy.service(),
                self.proxy.path().as_str(),
                self.config.event_capacity,
            )
            .await
    }

    /// Stops the subscription and removes the bus filter. No-op when not
    /// subscribed.
    pub async fn unsubscribe(&self) {
        self.subscription.unsubscribe().await
    }

    pub async fn is_subscribed(&self) -> bool {
        self.subscription.is_subscribed().await
    }
}

#[async_trait]
impl Render for NetworkManager {
    async fn render(&self) -> Result<RenderMap> {
        let devices = self.devices().await?;

        let mut map = RenderMap::new();
        map.insert("NetworkState".into(), self.state().await?.to_string().into());
        map.insert("Devices".into(), render_all(&devices).await?);
        Ok(map)
    }
}

fn parse_path(path: &str) -> Result<OwnedObjectPath> {
    OwnedObjectPath::try_from(path).map_err(|_| NmError::InvalidPath(path.to_string()))
}

fn path_arg(path: &OwnedObjectPath) -> OwnedValue {
    OwnedValue::from(path.clone().into_inner())
}
