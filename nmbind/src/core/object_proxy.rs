//! Generic handle to one remote object.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::api::models::NmError;
use crate::core::coerce::{coerce, FromVariant};
use crate::dbus::Transport;
use crate::types::constants::{service, Member};
use crate::Result;

/// A bus name plus object path, bound to a transport.
///
/// The proxy holds no state of its own. Every accessor is a fresh remote
/// read; nothing is cached, so two reads may observe different values if the
/// remote side changed in between. Building a proxy performs no I/O and
/// dropping it performs no teardown.
///
/// Two proxies compare equal when they name the same object of the same
/// service.
#[derive(Clone)]
pub struct ObjectProxy {
    transport: Arc<dyn Transport>,
    service: Arc<str>,
    path: OwnedObjectPath,
}

impl ObjectProxy {
    pub fn new(transport: Arc<dyn Transport>, service: Arc<str>, path: OwnedObjectPath) -> Self {
        Self {
            transport,
            service,
            path,
        }
    }

    /// Object path this proxy refers to.
    pub fn path(&self) -> &OwnedObjectPath {
        &self.path
    }

    /// Bus name of the owning service.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// A proxy for another object of the same service.
    pub fn sibling(&self, path: OwnedObjectPath) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            service: Arc::clone(&self.service),
            path,
        }
    }

    /// Reads a property without interpreting it.
    pub async fn property(&self, member: Member) -> Result<OwnedValue> {
        debug!("Reading {member} from {}", self.path);
        self.transport
            .get_property(&self.service, self.path.as_str(), member)
            .await
            .map_err(|e| e.for_read(self.path.as_str()))
    }

    /// Reads a property and coerces it to `T`.
    pub async fn property_as<T: FromVariant>(&self, member: Member) -> Result<T> {
        let raw = self.property(member).await?;
        coerce(member, &raw)
    }

    /// Reads an object-valued property. The `/` sentinel yields `None`.
    pub async fn object_property(&self, member: Member) -> Result<Option<OwnedObjectPath>> {
        let path: OwnedObjectPath = self.property_as(member).await?;
        Ok(non_sentinel(path))
    }

    /// Reads a list-of-objects property, skipping `/` entries.
    pub async fn object_list_property(&self, member: Member) -> Result<Vec<OwnedObjectPath>> {
        let paths: Vec<OwnedObjectPath> = self.property_as(member).await?;
        Ok(drop_sentinels(member, paths))
    }

    /// Invokes a method and returns its raw output arguments.
    pub async fn call(&self, member: Member, args: &[OwnedValue]) -> Result<Vec<OwnedValue>> {
        debug!("Calling {member} on {}", self.path);
        self.transport
            .call_method(&self.service, self.path.as_str(), member, args)
            .await
            .map_err(|e| e.for_call(self.path.as_str()))
    }

    /// Invokes a method that returns exactly one value and coerces it to `T`.
    pub async fn call_as<T: FromVariant>(&self, member: Member, args: &[OwnedValue]) -> Result<T> {
        let reply = self.call(member, args).await?;
        match reply.as_slice() {
            [single] => coerce(member, single),
            other => Err(NmError::TypeMismatch {
                member: member.to_string(),
                expected: T::signature(),
                found: reply_signature(other),
            }),
        }
    }

    /// Invokes a method whose reply carries no meaningful value.
    pub async fn call_unit(&self, member: Member, args: &[OwnedValue]) -> Result<()> {
        self.call(member, args).await.map(|_| ())
    }
}

impl fmt::Debug for ObjectProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectProxy")
            .field("service", &self.service)
            .field("path", &self.path.as_str())
            .finish()
    }
}

impl PartialEq for ObjectProxy {
    fn eq(&self, other: &Self) -> bool {
        self.service == other.service && self.path == other.path
    }
}

impl Eq for ObjectProxy {}

pub(crate) fn non_sentinel(path: OwnedObjectPath) -> Option<OwnedObjectPath> {
    (path.as_str() != service::NO_OBJECT).then_some(path)
}

pub(crate) fn drop_sentinels(member: Member, paths: Vec<OwnedObjectPath>) -> Vec<OwnedObjectPath> {
    paths
        .into_iter()
        .filter(|p| {
            let keep = p.as_str() != service::NO_OBJECT;
            if !keep {
                warn!("Skipping '/' entry in {member}");
            }
            keep
        })
        .collect()
}

fn reply_signature(values: &[OwnedValue]) -> String {
    values
        .iter()
        .map(|v| v.value_signature().to_string())
        .collect()
}
