//! Relationship field values.
//!
//! The server encodes a single-record reference ("many-to-one") as a
//! two-element array `[id, display_name]` and an unset field of any type
//! as `false`. Multi-record references are plain id arrays and need no
//! wrapper beyond `Vec<RecordId>`.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::RecordId;

/// A many-to-one reference: the target id plus its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Many2One {
    pub id: RecordId,
    pub name: String,
}

impl Many2One {
    /// Extract the id component from a raw field value, if it is a
    /// relationship pair.
    pub fn id_of(value: &Value) -> Option<&Value> {
        match value {
            Value::Array(items) => items.first(),
            _ => None,
        }
    }
}

impl Serialize for Many2One {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.id)?;
        seq.serialize_element(&self.name)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Many2One {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Array(items) if !items.is_empty() => {
                let id = items[0]
                    .as_i64()
                    .ok_or_else(|| D::Error::custom("many-to-one id must be an integer"))?;
                let name = match items.get(1) {
                    Some(Value::String(s)) => s.clone(),
                    _ => String::new(),
                };
                Ok(Self { id, name })
            }
            other => Err(D::Error::custom(format!(
                "expected [id, name] pair, got {other}"
            ))),
        }
    }
}

/// `deserialize_with` helper mapping the server's "unset" markers
/// (`false` and `null`) to `None`.
pub fn falsy_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        value => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
    }
}

/// `deserialize_with` helper for id lists that may come back as `false`.
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(falsy_none(deserializer)?.unwrap_or_default())
}
