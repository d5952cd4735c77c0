//! # schoolsync-store
//!
//! Storage layer for the school app's document database.
//!
//! This crate provides:
//! - `FieldValue` / `Timestamp`: the closed value model of stored fields
//! - `Document` and `Patch`: records and partial-field merge writes
//! - `DocumentStore`: the scan / merge-write seam repair passes run against
//! - `DirectoryStore`: a JSONL project mirror on disk
//! - `MemoryStore`: an in-memory store that records writes
//!
//! ## Data model
//!
//! ```text
//! <project>/<collection>.jsonl   (one line per document)
//!     ↕  load / lock-scoped merge
//! Collection (documents indexed by id)
//! ```

pub mod atomic_store;
pub mod collection;
pub mod directory;
pub mod document;
pub mod jsonl;
pub mod memory;
pub mod patch;
pub mod store;
pub mod value;

pub use atomic_store::{collection_lock_path, mutate_collection_jsonl};
pub use collection::Collection;
pub use directory::{COLLECTION_FILE_EXTENSION, DirectoryStore};
pub use document::Document;
pub use jsonl::{CollectionFile, JsonlError};
pub use memory::{MemoryStore, WriteRecord};
pub use patch::{FieldWrite, Patch, SERVER_TIMESTAMP_TAG};
pub use store::{DocumentStore, StoreError};
pub use value::{FieldValue, Fields, TIMESTAMP_TAG, Timestamp, field_is_blank};
