//! Partial-field patches and merge-write semantics.

use crate::value::{FieldValue, Fields, Timestamp};
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value};
use std::collections::BTreeMap;
use std::fmt;

/// JSON key marking a server-resolved timestamp in rendered patches.
pub const SERVER_TIMESTAMP_TAG: &str = "$serverTimestamp";

/// What a patch writes into one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Store this value (nested maps merge into existing maps).
    Set(FieldValue),
    /// Store the time at which the store performs the write.
    ServerTimestamp,
}

/// A set of top-level field writes against one document.
///
/// An empty patch means the document is already in canonical shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    writes: BTreeMap<String, FieldWrite>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Set `field` to `value`, replacing any earlier write to it.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.writes
            .insert(field.into(), FieldWrite::Set(value.into()));
        self
    }

    /// Stamp `field` with the store's write time.
    pub fn set_server_timestamp(&mut self, field: impl Into<String>) -> &mut Self {
        self.writes
            .insert(field.into(), FieldWrite::ServerTimestamp);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldWrite> {
        self.writes.get(field)
    }

    /// The value a field is set to, if the patch sets a concrete value.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        match self.writes.get(field) {
            Some(FieldWrite::Set(value)) => Some(value),
            _ => None,
        }
    }

    /// Merge this patch into `fields`, preserving fields it does not name.
    ///
    /// `now` resolves server-timestamp writes.
    pub fn merge_into(&self, fields: &mut Fields, now: Timestamp) {
        for (name, write) in &self.writes {
            match write {
                FieldWrite::Set(value) => merge_value(fields, name, value),
                FieldWrite::ServerTimestamp => {
                    fields.insert(name.clone(), FieldValue::Timestamp(now));
                }
            }
        }
    }

    pub fn to_json(&self) -> Value {
        let mut map = JsonMap::new();
        for (name, write) in &self.writes {
            let value = match write {
                FieldWrite::Set(value) => Value::from(value.clone()),
                FieldWrite::ServerTimestamp => {
                    let mut tagged = JsonMap::new();
                    tagged.insert(SERVER_TIMESTAMP_TAG.to_string(), Value::Bool(true));
                    Value::Object(tagged)
                }
            };
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }
}

fn merge_value(target: &mut Fields, name: &str, value: &FieldValue) {
    if let (Some(FieldValue::Map(existing)), FieldValue::Map(incoming)) =
        (target.get_mut(name), value)
    {
        for (key, nested) in incoming {
            merge_value(existing, key, nested);
        }
        return;
    }
    target.insert(name.to_string(), value.clone());
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
