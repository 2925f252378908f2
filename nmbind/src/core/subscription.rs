//! Event subscription channel.
//!
//! A subscription is a bus filter plus a bounded queue. A background task
//! forwards matching signals from the transport into the queue; when the
//! queue is full the incoming (newest) signal is discarded and counted, so a
//! slow consumer never blocks the transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use log::{debug, warn};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::models::Event;
use crate::dbus::Transport;
use crate::Result;

struct EventQueue {
    rx: Mutex<mpsc::Receiver<Event>>,
    dropped: Arc<AtomicU64>,
}

/// Consumer side of a subscription.
///
/// Clones share one queue: each event is received by exactly one caller of
/// [`recv`](Self::recv). Two handles compare equal when they share a queue.
#[derive(Clone)]
pub struct EventStream {
    queue: Arc<EventQueue>,
}

impl EventStream {
    /// Waits for the next event.
    ///
    /// Returns `None` once the subscription has been cancelled and the
    /// queue is drained.
    pub async fn recv(&self) -> Option<Event> {
        self.queue.rx.lock().await.recv().await
    }

    /// Returns a queued event without waiting.
    pub fn try_recv(&self) -> Option<Event> {
        self.queue.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Number of events discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    /// Adapts the handle into a [`Stream`](futures::Stream).
    pub fn into_stream(self) -> BoxStream<'static, Event> {
        futures::stream::unfold(self, |events| async move {
            let event = events.recv().await?;
            Some((event, events))
        })
        .boxed()
    }
}

impl PartialEq for EventStream {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}

impl Eq for EventStream {}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}

/// A live subscription: the consumer handle and the forwarding task.
struct Subscription {
    events: EventStream,
    forwarder: JoinHandle<()>,
}

impl Subscription {
    async fn open(
        transport: &Arc<dyn Transport>,
        service: &str,
        namespace: &str,
        capacity: usize,
    ) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut source = transport.subscribe(service, namespace, capacity).await?;

        let (tx, rx) = mpsc::channel(capacity);
        let dropped = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&dropped);

        let forwarder = tokio::spawn(async move {
            while let Some(event) = source.next().await {
                match tx.try_send(event) {
                    Ok(()) => {}
                    Err(TrySendError::Full(event)) => {
                        let total = counter.fetch_add(1, Ordering::Relaxed) + 1;
                        warn!(
                            "Event queue full, dropping {}.{} from {} ({total} dropped so far)",
                            event.interface, event.member, event.path
                        );
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!("Event consumers gone, stopping forwarder");
                        break;
                    }
                }
            }
            debug!("Event forwarder finished");
        });

        debug!("Subscribed to signals under {namespace} (capacity {capacity})");
        Ok(Self {
            events: EventStream {
                queue: Arc::new(EventQueue {
                    rx: Mutex::new(rx),
                    dropped,
                }),
            },
            forwarder,
        })
    }

    fn is_live(&self) -> bool {
        !self.forwarder.is_finished()
    }

    /// Stops forwarding and waits for the task, releasing the bus filter.
    async fn close(&mut self) {
        self.forwarder.abort();
        let _ = (&mut self.forwarder).await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Subscription state shared by clones of one entry object.
///
/// The lock is held while a filter is installed, so concurrent subscribers
/// observe a single channel.
#[derive(Clone, Default)]
pub(crate) struct SubscriptionSlot {
    inner: Arc<Mutex<Option<Subscription>>>,
}

impl SubscriptionSlot {
    pub(crate) async fn subscribe(
        &self,
        transport: &Arc<dyn Transport>,
        service: &str,
        namespace: &str,
        capacity: usize,
    ) -> Result<EventStream> {
        let mut slot = self.inner.lock().await;

        if let Some(existing) = slot.as_ref() {
            if existing.is_live() {
                debug!("Already subscribed, returning existing channel");
                return Ok(existing.events.clone());
            }
            debug!("Previous subscription ended, installing a new one");
        }

        let subscription = Subscription::open(transport, service, namespace, capacity).await?;
        let events = subscription.events.clone();
        *slot = Some(subscription);
        Ok(events)
    }

    pub(crate) async fn unsubscribe(&self) {
        let mut slot = self.inner.lock().await;
        match slot.take() {
            Some(mut subscription) => {
                subscription.close().await;
                debug!("Unsubscribed");
            }
            None => debug!("Unsubscribe requested while not subscribed"),
        }
    }

    pub(crate) async fn is_subscribed(&self) -> bool {
        self.inner.lock().await.as_ref().is_some_and(Subscription::is_live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::NmError;
    use crate::dbus::{EventSource, MemoryBus};
    use crate::types::constants::Member;
    use async_trait::async_trait;
    use zvariant::{OwnedObjectPath, OwnedValue};

    /// A transport whose signal source ends immediately.
    #[derive(Default)]
    struct EndedSource {
        capacity: std::sync::Mutex<Option<usize>>,
    }

    #[async_trait]
    impl Transport for EndedSource {
        async fn get_property(&self, _: &str, path: &str, member: Member) -> Result<OwnedValue> {
            Err(NmError::RemoteCall {
                name: "test.NotImplemented".into(),
                message: format!("{member} on {path}"),
            })
        }

        async fn call_method(
            &self,
            _: &str,
            path: &str,
            member: Member,
            _: &[OwnedValue],
        ) -> Result<Vec<OwnedValue>> {
            Err(NmError::RemoteCall {
                name: "test.NotImplemented".into(),
                message: format!("{member} on {path}"),
            })
        }

        async fn subscribe(&self, _: &str, _: &str, capacity: usize) -> Result<EventSource> {
            *self.capacity.lock().unwrap() = Some(capacity);
            Ok(futures::stream::empty().boxed())
        }
    }

    async fn wait_finished(slot: &SubscriptionSlot) {
        for _ in 0..100 {
            if !slot.is_subscribed().await {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("forwarder did not finish");
    }

    const NS: &str = "/org/freedesktop/NetworkManager";

    fn state_changed(code: u32) -> Event {
        Event {
            path: OwnedObjectPath::try_from(NS).unwrap(),
            interface: "org.freedesktop.NetworkManager".into(),
            member: "StateChanged".into(),
            args: vec![OwnedValue::from(code)],
        }
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let bus = MemoryBus::new();
        let transport: Arc<dyn Transport> = Arc::new(bus.clone());
        let slot = SubscriptionSlot::default();

        let events = slot.subscribe(&transport, "svc", NS, 10).await.unwrap();
        bus.emit(state_changed(40));
        bus.emit(state_changed(70));

        let first = events.recv().await.unwrap();
        let second = events.recv().await.unwrap();
        assert_eq!(first.args, vec![OwnedValue::from(40u32)]);
        assert_eq!(second.args, vec![OwnedValue::from(70u32)]);
        assert_eq!(events.dropped(), 0);
    }

    #[tokio::test]
    async fn unsubscribe_releases_filter_and_ends_stream() {
        let bus = MemoryBus::new();
        let transport: Arc<dyn Transport> = Arc::new(bus.clone());
        let slot = SubscriptionSlot::default();

        let events = slot.subscribe(&transport, "svc", NS, 10).await.unwrap();
        assert_eq!(bus.active_subscriptions(), 1);

        slot.unsubscribe().await;
        assert!(!slot.is_subscribed().await);
        assert_eq!(bus.active_subscriptions(), 0);
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn stream_adapter_yields_events() {
        let bus = MemoryBus::new();
        let transport: Arc<dyn Transport> = Arc::new(bus.clone());
        let slot = SubscriptionSlot::default();

        let events = slot.subscribe(&transport, "svc", NS, 10).await.unwrap();
        bus.emit(state_changed(20));
        bus.emit(state_changed(30));

        let collected: Vec<Event> = events.clone().into_stream().take(2).collect().await;
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[1].args, vec![OwnedValue::from(30u32)]);

        slot.unsubscribe().await;
        assert!(events.into_stream().next().await.is_none());
    }

    #[tokio::test]
    async fn ended_source_is_not_subscribed_and_is_replaced() {
        let ended = Arc::new(EndedSource::default());
        let transport: Arc<dyn Transport> = ended.clone();
        let slot = SubscriptionSlot::default();

        let first = slot.subscribe(&transport, "svc", NS, 10).await.unwrap();
        wait_finished(&slot).await;
        assert!(first.recv().await.is_none());

        let second = slot.subscribe(&transport, "svc", NS, 10).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped_before_reaching_transport() {
        let ended = Arc::new(EndedSource::default());
        let transport: Arc<dyn Transport> = ended.clone();
        let slot = SubscriptionSlot::default();

        slot.subscribe(&transport, "svc", NS, 0).await.unwrap();
        assert_eq!(*ended.capacity.lock().unwrap(), Some(1));
    }

    #[tokio::test]
    async fn stream_adapter_supports_next() {
        let bus = MemoryBus::new();
        let transport: Arc<dyn Transport> = Arc::new(bus.clone());
        let slot = SubscriptionSlot::default();

        let mut stream = slot
            .subscribe(&transport, "svc", NS, 10)
            .await
            .unwrap()
            .into_stream();
        bus.emit(state_changed(50));

        let event = stream.next().await.unwrap();
        assert_eq!(event.args, vec![OwnedValue::from(50u32)]);
    }
}
