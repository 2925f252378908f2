//! Conversion of untyped bus values into semantic types.
//!
//! Every conversion is exact: a `u32` is read only from a D-Bus `u`, a string
//! only from an `s`, and so on. There is no widening, no parsing and no
//! defaulting. The only leniency is that a single enclosing variant (`v`)
//! around the whole value is looked through, since `Properties.Get` returns
//! one. Nested variants are not.

use std::collections::HashMap;
use std::fmt::Display;

use zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::api::models::NmError;
use crate::Result;

/// A type that can be read out of a D-Bus value with an exact signature.
pub trait FromVariant: Sized {
    /// D-Bus signature this type accepts.
    fn signature() -> String;

    /// Converts `value`, or returns `None` when its shape does not match.
    fn from_variant(value: &Value<'_>) -> Option<Self>;
}

/// Coerces `raw` to `T`, reporting `member` in the error on mismatch.
pub fn coerce<T: FromVariant>(member: impl Display, raw: &OwnedValue) -> Result<T> {
    let value: &Value<'_> = raw;
    if let Some(converted) = T::from_variant(value) {
        return Ok(converted);
    }

    let value = match value {
        Value::Value(inner) => inner.as_ref(),
        other => other,
    };
    T::from_variant(value).ok_or_else(|| NmError::TypeMismatch {
        member: member.to_string(),
        expected: T::signature(),
        found: value.value_signature().to_string(),
    })
}

macro_rules! primitive {
    ($ty:ty, $sig:literal, $variant:ident) => {
        impl FromVariant for $ty {
            fn signature() -> String {
                $sig.to_string()
            }

            fn from_variant(value: &Value<'_>) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

primitive!(bool, "b", Bool);
primitive!(u8, "y", U8);
primitive!(u16, "q", U16);
primitive!(u32, "u", U32);
primitive!(u64, "t", U64);

impl FromVariant for String {
    fn signature() -> String {
        "s".to_string()
    }

    fn from_variant(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.as_str().to_owned()),
            _ => None,
        }
    }
}

impl FromVariant for OwnedObjectPath {
    fn signature() -> String {
        "o".to_string()
    }

    fn from_variant(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::ObjectPath(p) => Some(OwnedObjectPath::from(p.clone())),
            _ => None,
        }
    }
}

/// A variant leaf, unwrapped one level and kept dynamic.
impl FromVariant for OwnedValue {
    fn signature() -> String {
        "v".to_string()
    }

    fn from_variant(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::Value(inner) => inner.try_to_owned().ok(),
            _ => None,
        }
    }
}

impl<T: FromVariant> FromVariant for Vec<T> {
    fn signature() -> String {
        format!("a{}", T::signature())
    }

    fn from_variant(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::Array(array) if array.element_signature().to_string() == T::signature() => {
                array.inner().iter().map(T::from_variant).collect()
            }
            _ => None,
        }
    }
}

impl<T: FromVariant> FromVariant for HashMap<String, T> {
    fn signature() -> String {
        format!("a{{s{}}}", T::signature())
    }

    fn from_variant(value: &Value<'_>) -> Option<Self> {
        let Value::Dict(dict) = value else {
            return None;
        };
        if dict.signature().to_string() != Self::signature() {
            return None;
        }

        dict.iter()
            .map(|(k, v)| Some((String::from_variant(k)?, T::from_variant(v)?)))
            .collect()
    }
}
