//! Document type: one stored record of a collection.

use crate::patch::Patch;
use crate::value::{FieldValue, Fields, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored document: identifier plus its field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_fields(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Builder-style field assignment, mostly for fixtures.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Apply a merge write to this document.
    pub fn merge(&mut self, patch: &Patch, now: Timestamp) {
        patch.merge_into(&mut self.fields, now);
    }
}
