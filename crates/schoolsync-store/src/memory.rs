//! In-memory document store.
//!
//! Keeps every merge write it receives so callers can check exactly which
//! documents a run touched.

use crate::collection::Collection;
use crate::document::Document;
use crate::patch::Patch;
use crate::store::{DocumentStore, StoreError};
use crate::value::Timestamp;
use std::collections::BTreeMap;

/// One merge write received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub collection: String,
    pub id: String,
    pub patch: Patch,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Collection>,
    writes: Vec<WriteRecord>,
    offline: bool,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every call as unreachable.
    pub fn unreachable() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Make every subsequent merge write fail.
    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Insert or replace documents in `collection`.
    pub fn insert_all(&mut self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let target = self.collections.entry(collection.to_string()).or_default();
        for document in documents {
            target.upsert(document);
        }
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<&Document> {
        self.collections.get(collection)?.document(id)
    }

    /// Merge writes received so far, in call order.
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unreachable("in-memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    fn list_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_reachable()?;
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.snapshot(limit))
            .unwrap_or_default())
    }

    fn merge_write(&mut self, collection: &str, id: &str, patch: &Patch) -> Result<(), StoreError> {
        self.check_reachable()?;
        if self.reject_writes {
            return Err(StoreError::WriteRejected {
                collection: collection.to_string(),
                id: id.to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .merge(id, patch, Timestamp::now());
        self.writes.push(WriteRecord {
            collection: collection.to_string(),
            id: id.to_string(),
            patch: patch.clone(),
        });
        Ok(())
    }
}
