//! Canonical in-memory representation of one collection.
//!
//! Documents are indexed by ID so scans come out in deterministic order
//! regardless of how the backing file was written.

use crate::document::Document;
use crate::jsonl::{CollectionFile, JsonlError};
use crate::patch::Patch;
use crate::value::Timestamp;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    notes: Vec<String>,
    documents: BTreeMap<String, Document>,
}

impl Collection {
    /// Build a collection from fully-materialized documents.
    ///
    /// Duplicate IDs resolve last-write-wins, matching append-style exports.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut index = BTreeMap::new();
        for document in documents {
            index.insert(document.id.clone(), document);
        }
        Self {
            notes: Vec::new(),
            documents: index,
        }
    }

    /// Load a collection file, keeping its `#` notes for the next save.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, JsonlError> {
        let file = CollectionFile::read(path)?;
        Ok(Self {
            notes: file.notes,
            ..Self::from_documents(file.documents)
        })
    }

    /// Rewrite the collection file in ID order.
    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), JsonlError> {
        CollectionFile {
            notes: self.notes.clone(),
            documents: self.documents.values().cloned().collect(),
        }
        .write(path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Insert or replace a document by ID, returning the previous one.
    pub fn upsert(&mut self, document: Document) -> Option<Document> {
        self.documents.insert(document.id.clone(), document)
    }

    /// Merge a patch into document `id`, creating the document if missing.
    pub fn merge(&mut self, id: &str, patch: &Patch, now: Timestamp) {
        self.documents
            .entry(id.to_string())
            .or_insert_with(|| Document::new(id))
            .merge(patch, now);
    }

    /// Iterate documents in ID order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Clone out at most `limit` documents in ID order (`None` = all).
    pub fn snapshot(&self, limit: Option<usize>) -> Vec<Document> {
        self.documents()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
