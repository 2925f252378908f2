//! The bus transport seam.
//!
//! Everything above this module talks to the remote service through
//! [`Transport`]. [`DbusTransport`] is the zbus-backed implementation used
//! against a real daemon.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use log::{debug, warn};
use zbus::message::{Body, Type as MessageType};
use zbus::{Connection, MatchRule, Message, MessageStream};
use zvariant::{OwnedObjectPath, OwnedStructure, OwnedValue, Structure, StructureBuilder, Value};

use crate::api::models::{Event, NmError};
use crate::types::constants::{interface, Member};
use crate::Result;

/// Signals delivered by a transport subscription.
///
/// Dropping the stream removes the underlying bus filter.
pub type EventSource = BoxStream<'static, Event>;

/// Call/reply and signal primitives the object graph is built on.
///
/// Implementations perform no caching and no retries: each call reaches the
/// remote side once and reports whatever happened.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reads one property of the object at `path`.
    async fn get_property(&self, service: &str, path: &str, member: Member) -> Result<OwnedValue>;

    /// Invokes a method and returns its output arguments in order.
    async fn call_method(
        &self,
        service: &str,
        path: &str,
        member: Member,
        args: &[OwnedValue],
    ) -> Result<Vec<OwnedValue>>;

    /// Installs a signal filter for every object at or below `namespace`.
    ///
    /// `capacity` bounds how many undelivered messages the transport itself
    /// may hold for this filter.
    async fn subscribe(&self, service: &str, namespace: &str, capacity: usize)
    -> Result<EventSource>;
}

/// [`Transport`] over a zbus connection.
///
/// Cloning is cheap and shares the connection.
#[derive(Debug, Clone)]
pub struct DbusTransport {
    conn: Connection,
}

impl DbusTransport {
    /// Wraps an existing connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Connects to the system bus.
    pub async fn system() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl Transport for DbusTransport {
    async fn get_property(&self, service: &str, path: &str, member: Member) -> Result<OwnedValue> {
        let reply = self
            .conn
            .call_method(
                Some(service),
                path,
                Some(interface::PROPERTIES),
                "Get",
                &(member.interface, member.name),
            )
            .await?;

        let body = reply.body();
        let value: OwnedValue = body.deserialize()?;
        Ok(value)
    }

    async fn call_method(
        &self,
        service: &str,
        path: &str,
        member: Member,
        args: &[OwnedValue],
    ) -> Result<Vec<OwnedValue>> {
        let reply = match args_body(args)? {
            Some(body) => {
                self.conn
                    .call_method(Some(service), path, Some(member.interface), member.name, &body)
                    .await?
            }
            None => {
                self.conn
                    .call_method(Some(service), path, Some(member.interface), member.name, &())
                    .await?
            }
        };

        body_values(&reply.body())
    }

    async fn subscribe(
        &self,
        service: &str,
        namespace: &str,
        capacity: usize,
    ) -> Result<EventSource> {
        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .path_namespace(namespace.to_string())?
            .build();

        let stream = MessageStream::for_match_rule(rule, &self.conn, Some(capacity)).await?;
        debug!("Installed signal filter for {service} under {namespace}");

        let events = stream.filter_map(|msg| async move {
            match msg {
                Ok(msg) => match event_from_message(&msg) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        warn!("Skipping undecodable signal: {e}");
                        None
                    }
                },
                Err(e) => {
                    warn!("Signal stream error: {e}");
                    None
                }
            }
        });

        Ok(events.boxed())
    }
}

/// Packs call arguments into one structure so each keeps its own signature.
/// `None` for a call without arguments.
fn args_body(args: &[OwnedValue]) -> Result<Option<Structure<'static>>> {
    if args.is_empty() {
        return Ok(None);
    }

    let body = args
        .iter()
        .try_fold(StructureBuilder::new(), |builder, arg| {
            arg.try_clone().map(|a| builder.append_field(Value::from(a)))
        })?
        .build()?;
    Ok(Some(body))
}

/// Decodes a message body into one value per argument.
fn body_values(body: &Body) -> Result<Vec<OwnedValue>> {
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let structure: OwnedStructure = body.deserialize()?;
    structure
        .0
        .into_fields()
        .into_iter()
        .map(|field| OwnedValue::try_from(field).map_err(NmError::from))
        .collect()
}

fn event_from_message(msg: &Message) -> Result<Event> {
    let header = msg.header();
    let path = header
        .path()
        .cloned()
        .map(OwnedObjectPath::from)
        .ok_or(zbus::Error::MissingField)?;
    let interface = header
        .interface()
        .map(|i| i.to_string())
        .unwrap_or_default();
    let member = header.member().map(|m| m.to_string()).unwrap_or_default();

    Ok(Event {
        path,
        interface,
        member,
        args: body_values(&msg.body())?,
    })
}
