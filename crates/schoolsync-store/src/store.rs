//! The document-store collaborator seen by repair passes.

use crate::document::Document;
use crate::jsonl::JsonlError;
use crate::patch::Patch;

/// Errors raised while talking to a document store.
///
/// Every variant means the store could not be read or refused a write; the
/// caller treats all of them as fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),

    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("collection lock busy: {lock_path}")]
    LockBusy { lock_path: String },

    #[error("failed to acquire collection lock {lock_path}: {message}")]
    LockIo { lock_path: String, message: String },

    #[error("write rejected for {collection}/{id}: {reason}")]
    WriteRejected {
        collection: String,
        id: String,
        reason: String,
    },
}

/// Scan-and-merge access to a document database.
pub trait DocumentStore {
    /// Current documents of `collection`, at most `limit` of them.
    ///
    /// A collection that was never written is empty, not an error.
    fn list_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Merge `patch` into document `id`, keeping fields the patch does not name.
    fn merge_write(&mut self, collection: &str, id: &str, patch: &Patch) -> Result<(), StoreError>;
}
