//! In-process object table implementing [`Transport`].
//!
//! `MemoryBus` holds objects, their properties and method handlers in memory
//! and answers calls the way the bus daemon would, including the standard
//! `UnknownObject` / `UnknownMethod` errors. It exists so object graphs can be
//! exercised without a running NetworkManager.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::stream::StreamExt;
use log::debug;
use tokio::sync::mpsc;
use zvariant::{OwnedObjectPath, OwnedValue};

use super::transport::{EventSource, Transport};
use crate::api::models::{Event, NmError};
use crate::types::constants::{dbus_errors, Member};
use crate::Result;

/// Handler invoked for a method call on a [`MemoryBus`] object.
pub type MethodHandler = Arc<dyn Fn(&[OwnedValue]) -> Result<Vec<OwnedValue>> + Send + Sync>;

/// A method call recorded by [`MemoryBus`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub member: Member,
    pub args: Vec<OwnedValue>,
}

#[derive(Default)]
struct Object {
    properties: HashMap<Member, OwnedValue>,
    methods: HashMap<Member, MethodHandler>,
}

struct Filter {
    namespace: String,
    tx: mpsc::UnboundedSender<Event>,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<String, Object>,
    calls: Vec<RecordedCall>,
    filters: Vec<Filter>,
    filters_installed: usize,
}

/// In-memory [`Transport`].
///
/// Clones share the same object table. The service name passed to the
/// transport methods is ignored; one `MemoryBus` models one service.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use nmbind::{MemoryBus, NetworkManager, ClientConfig, NmState};
/// use nmbind::types::constants::{nm, service};
/// use zvariant::OwnedValue;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> nmbind::Result<()> {
/// let bus = MemoryBus::new();
/// bus.set_property(service::ROOT_PATH, nm::STATE, OwnedValue::from(70u32));
///
/// let nm = NetworkManager::with_transport(Arc::new(bus), ClientConfig::default())?;
/// assert_eq!(nm.state().await?, NmState::ConnectedGlobal);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryBus {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for MemoryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryBus")
            .field("objects", &state.objects.keys().collect::<Vec<_>>())
            .field("filters", &state.filters.len())
            .finish()
    }
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking handler must not wedge every later call.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an object with no properties. Existing objects are kept.
    pub fn add_object(&self, path: &str) {
        self.lock().objects.entry(path.to_string()).or_default();
    }

    /// Removes an object; later reads against it fail with `UnknownObject`.
    pub fn remove_object(&self, path: &str) {
        self.lock().objects.remove(path);
    }

    /// Sets a property, creating the object if needed.
    pub fn set_property(&self, path: &str, member: Member, value: OwnedValue) {
        self.lock()
            .objects
            .entry(path.to_string())
            .or_default()
            .properties
            .insert(member, value);
    }

    /// Installs a method handler, creating the object if needed.
    pub fn on_call<F>(&self, path: &str, member: Member, handler: F)
    where
        F: Fn(&[OwnedValue]) -> Result<Vec<OwnedValue>> + Send + Sync + 'static,
    {
        self.lock()
            .objects
            .entry(path.to_string())
            .or_default()
            .methods
            .insert(member, Arc::new(handler));
    }

    /// Method calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Calls received for `member`, oldest first.
    pub fn calls_to(&self, member: Member) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.member == member)
            .cloned()
            .collect()
    }

    /// Number of signal filters ever installed.
    pub fn subscribe_count(&self) -> usize {
        self.lock().filters_installed
    }

    /// Number of signal filters whose consumer is still alive.
    pub fn active_subscriptions(&self) -> usize {
        let mut state = self.lock();
        state.filters.retain(|f| !f.tx.is_closed());
        state.filters.len()
    }

    /// Delivers `event` to every live filter whose namespace covers its path.
    ///
    /// Returns the number of filters that received it.
    pub fn emit(&self, event: Event) -> usize {
        let mut state = self.lock();
        state.filters.retain(|f| !f.tx.is_closed());

        let mut delivered = 0;
        for filter in &state.filters {
            if in_namespace(&filter.namespace, event.path.as_str())
                && filter.tx.send(event.clone()).is_ok()
            {
                delivered += 1;
            }
        }
        delivered
    }
}

/// D-Bus `path_namespace` matching.
fn in_namespace(namespace: &str, path: &str) -> bool {
    if namespace == "/" {
        return true;
    }
    match path.strip_prefix(namespace) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn unknown(name: &str, message: String) -> NmError {
    NmError::RemoteCall {
        name: name.to_string(),
        message,
    }
}

#[async_trait]
impl Transport for MemoryBus {
    async fn get_property(&self, _service: &str, path: &str, member: Member) -> Result<OwnedValue> {
        let state = self.lock();
        let object = state
            .objects
            .get(path)
            .ok_or_else(|| unknown(dbus_errors::UNKNOWN_OBJECT, format!("No such object {path}")))?;

        object.properties.get(&member).cloned().ok_or_else(|| {
            unknown(
                dbus_errors::UNKNOWN_PROPERTY,
                format!("No such property {member} on {path}"),
            )
        })
    }

    async fn call_method(
        &self,
        _service: &str,
        path: &str,
        member: Member,
        args: &[OwnedValue],
    ) -> Result<Vec<OwnedValue>> {
        let handler = {
            let mut state = self.lock();
            state.calls.push(RecordedCall {
                path: path.to_string(),
                member,
                args: args.to_vec(),
            });

            let object = state.objects.get(path).ok_or_else(|| {
                unknown(dbus_errors::UNKNOWN_OBJECT, format!("No such object {path}"))
            })?;
            object.methods.get(&member).cloned().ok_or_else(|| {
                unknown(
                    dbus_errors::UNKNOWN_METHOD,
                    format!("No such method {member} on {path}"),
                )
            })?
        };

        // Handlers may call back into the bus.
        handler(args)
    }

    async fn subscribe(
        &self,
        _service: &str,
        namespace: &str,
        _capacity: usize,
    ) -> Result<EventSource> {
        OwnedObjectPath::try_from(namespace.to_string())
            .map_err(|_| NmError::InvalidPath(namespace.to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut state = self.lock();
            state.filters.push(Filter {
                namespace: namespace.to_string(),
                tx,
            });
            state.filters_installed += 1;
        }
        debug!("MemoryBus: filter installed under {namespace}");

        let events = futures::stream::poll_fn(move |cx| rx.poll_recv(cx));
        Ok(events.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constants::{device, nm};
    use zvariant::Str;

    fn event(path: &str) -> Event {
        Event {
            path: OwnedObjectPath::try_from(path).unwrap(),
            interface: "org.freedesktop.NetworkManager".into(),
            member: "StateChanged".into(),
            args: vec![OwnedValue::from(70u32)],
        }
    }

    #[test]
    fn namespace_matching() {
        assert!(in_namespace("/", "/anything"));
        assert!(in_namespace("/a/b", "/a/b"));
        assert!(in_namespace("/a/b", "/a/b/c"));
        assert!(!in_namespace("/a/b", "/a/bc"));
        assert!(!in_namespace("/a/b", "/a"));
    }

    #[tokio::test]
    async fn unknown_object_and_property() {
        let bus = MemoryBus::new();
        bus.set_property("/dev/1", device::INTERFACE, OwnedValue::from(Str::from("eth0")));

        let err = bus.get_property("svc", "/dev/2", device::INTERFACE).await.unwrap_err();
        assert!(matches!(err, NmError::RemoteCall { ref name, .. } if name == dbus_errors::UNKNOWN_OBJECT));

        let err = bus.get_property("svc", "/dev/1", device::STATE).await.unwrap_err();
        assert!(matches!(err, NmError::RemoteCall { ref name, .. } if name == dbus_errors::UNKNOWN_PROPERTY));
    }

    #[tokio::test]
    async fn calls_are_recorded_and_dispatched() {
        let bus = MemoryBus::new();
        bus.on_call("/nm", nm::GET_DEVICES, |_| Ok(vec![OwnedValue::from(1u32)]));

        let out = bus.call_method("svc", "/nm", nm::GET_DEVICES, &[]).await.unwrap();
        assert_eq!(out, vec![OwnedValue::from(1u32)]);

        let err = bus
            .call_method("svc", "/nm", nm::DEACTIVATE_CONNECTION, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, NmError::RemoteCall { ref name, .. } if name == dbus_errors::UNKNOWN_METHOD));

        assert_eq!(bus.calls().len(), 2);
        assert_eq!(bus.calls_to(nm::GET_DEVICES).len(), 1);
    }

    #[tokio::test]
    async fn emit_respects_namespace_and_drop() {
        let bus = MemoryBus::new();
        let mut stream = bus.subscribe("svc", "/org/freedesktop/NetworkManager", 4).await.unwrap();

        assert_eq!(bus.emit(event("/org/freedesktop/NetworkManager/Devices/1")), 1);
        assert_eq!(bus.emit(event("/org/freedesktop/Other")), 0);

        let got = stream.next().await.unwrap();
        assert_eq!(got.path.as_str(), "/org/freedesktop/NetworkManager/Devices/1");
        assert_eq!(bus.active_subscriptions(), 1);

        drop(stream);
        assert_eq!(bus.active_subscriptions(), 0);
        assert_eq!(bus.subscribe_count(), 1);
    }
}
