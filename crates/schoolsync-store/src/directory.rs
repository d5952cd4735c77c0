//! Project mirror on disk: one directory per project, one JSONL file per
//! collection.
//!
//! ```text
//! <store-root>/<project>/
//!     accounts.jsonl
//!     groups.jsonl
//!     ...
//! ```

use crate::atomic_store::mutate_collection_jsonl;
use crate::collection::Collection;
use crate::document::Document;
use crate::patch::Patch;
use crate::store::{DocumentStore, StoreError};
use crate::value::Timestamp;
use std::path::{Path, PathBuf};

/// File extension of collection files inside a project directory.
pub const COLLECTION_FILE_EXTENSION: &str = "jsonl";

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    project_dir: PathBuf,
}

impl DirectoryStore {
    /// Connect to `<store_root>/<project>`.
    ///
    /// The project directory must already exist; nothing is created here.
    pub fn open(store_root: impl AsRef<Path>, project: &str) -> Result<Self, StoreError> {
        if !is_plain_name(project) {
            return Err(StoreError::Unreachable(format!(
                "invalid project identifier {project:?}"
            )));
        }
        let project_dir = store_root.as_ref().join(project);
        if !project_dir.is_dir() {
            return Err(StoreError::Unreachable(format!(
                "project directory not found: {}",
                project_dir.display()
            )));
        }
        Ok(Self { project_dir })
    }

    pub fn collection_path(&self, collection: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_name(collection) {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }
        Ok(self
            .project_dir
            .join(format!("{collection}.{COLLECTION_FILE_EXTENSION}")))
    }

    fn ensure_reachable(&self) -> Result<(), StoreError> {
        if self.project_dir.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Unreachable(format!(
                "project directory disappeared: {}",
                self.project_dir.display()
            )))
        }
    }
}

impl DocumentStore for DirectoryStore {
    fn list_documents(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_reachable()?;
        let path = self.collection_path(collection)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(Collection::load_jsonl(&path)?.snapshot(limit))
    }

    fn merge_write(&mut self, collection: &str, id: &str, patch: &Patch) -> Result<(), StoreError> {
        self.ensure_reachable()?;
        let path = self.collection_path(collection)?;
        let now = Timestamp::now();
        mutate_collection_jsonl(&path, |docs| {
            docs.merge(id, patch, now);
            ((), true)
        })
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
