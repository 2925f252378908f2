//! Generic key/value rendering of wrappers.
//!
//! [`Render`] turns a wrapper into a [`RenderMap`] by reading its properties
//! and recursing into the objects it references. The map is
//! `serde::Serialize`, so callers pick the output format.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use zvariant::{OwnedValue, Value};

use crate::Result;

/// Rendered properties, keyed by display name.
pub type RenderMap = BTreeMap<String, RenderValue>;

/// A rendered property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderValue {
    /// Absent object reference or a value with no textual form.
    Null,
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    List(Vec<RenderValue>),
    Map(RenderMap),
}

impl RenderValue {
    /// Converts a dynamic bus value, recursing into containers.
    pub fn from_variant(value: &OwnedValue) -> Self {
        Self::from_value(value)
    }

    fn from_value(value: &Value<'_>) -> Self {
        match value {
            Value::U8(v) => Self::Unsigned(u64::from(*v)),
            Value::U16(v) => Self::Unsigned(u64::from(*v)),
            Value::U32(v) => Self::Unsigned(u64::from(*v)),
            Value::U64(v) => Self::Unsigned(*v),
            Value::I16(v) => Self::Signed(i64::from(*v)),
            Value::I32(v) => Self::Signed(i64::from(*v)),
            Value::I64(v) => Self::Signed(*v),
            Value::F64(v) => Self::Float(*v),
            Value::Bool(v) => Self::Bool(*v),
            Value::Str(s) => Self::Text(s.as_str().to_owned()),
            Value::ObjectPath(p) => Self::Text(p.as_str().to_owned()),
            Value::Signature(s) => Self::Text(s.to_string()),
            Value::Value(inner) => Self::from_value(inner),
            Value::Array(array) => Self::List(array.inner().iter().map(Self::from_value).collect()),
            Value::Structure(s) => Self::List(s.fields().iter().map(Self::from_value).collect()),
            Value::Dict(dict) => Self::Map(
                dict.iter()
                    .map(|(k, v)| (key_text(k), Self::from_value(v)))
                    .collect(),
            ),
            #[allow(unreachable_patterns)]
            _ => Self::Null,
        }
    }
}

fn key_text(key: &Value<'_>) -> String {
    match key {
        Value::Str(s) => s.as_str().to_owned(),
        Value::ObjectPath(p) => p.as_str().to_owned(),
        other => other.to_string(),
    }
}

impl From<bool> for RenderValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for RenderValue {
    fn from(v: u8) -> Self {
        Self::Unsigned(u64::from(v))
    }
}

impl From<u32> for RenderValue {
    fn from(v: u32) -> Self {
        Self::Unsigned(u64::from(v))
    }
}

impl From<String> for RenderValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for RenderValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<RenderMap> for RenderValue {
    fn from(v: RenderMap) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<RenderValue>> From<Vec<T>> for RenderValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RenderValue>> From<Option<T>> for RenderValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Produces a generic key/value view of a remote object.
///
/// Rendering performs one remote read per property and fails on the first
/// read that fails.
#[async_trait]
pub trait Render {
    async fn render(&self) -> Result<RenderMap>;
}

/// Renders each item in order.
pub(crate) async fn render_all<T: Render + Sync>(items: &[T]) -> Result<RenderValue> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(RenderValue::Map(item.render().await?));
    }
    Ok(RenderValue::List(out))
}

/// Renders an optional association, `Null` when absent.
pub(crate) async fn render_opt<T: Render + Sync>(item: Option<&T>) -> Result<RenderValue> {
    match item {
        Some(item) => Ok(RenderValue::Map(item.render().await?)),
        None => Ok(RenderValue::Null),
    }
}
