//! Client configuration.

use crate::types::constants::{defaults, service};

/// Settings for a [`NetworkManager`](crate::NetworkManager) entry object.
///
/// The defaults target the system NetworkManager daemon. Override the service
/// name or root path when talking to a test daemon on a private bus.
///
/// # Examples
///
/// ```rust
/// use nmbind::ClientConfig;
///
/// let config = ClientConfig::new().with_event_capacity(64);
/// assert_eq!(config.event_capacity, 64);
/// assert_eq!(config.service, "org.freedesktop.NetworkManager");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bus name of the remote service.
    pub service: String,
    /// Path of the service root object; also the namespace events are filtered on.
    pub root_path: String,
    /// Number of notifications buffered per subscription.
    pub event_capacity: usize,
}

impl ClientConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bus name of the remote service.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Sets the root object path.
    #[must_use]
    pub fn with_root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = path.into();
        self
    }

    /// Sets the subscription queue capacity. Zero is raised to one.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: service::NAME.to_string(),
            root_path: service::ROOT_PATH.to_string(),
            event_capacity: defaults::EVENT_QUEUE_CAPACITY,
        }
    }
}
