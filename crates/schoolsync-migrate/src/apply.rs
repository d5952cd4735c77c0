//! Committing patches: the only effectful step of a pass.

use crate::entity::Entity;
use schoolsync_store::{DocumentStore, Patch, StoreError};
use serde::Serialize;
use std::fmt;

/// Field stamped with the store's write time on applied account patches.
pub const UPDATED_AT: &str = "updatedAt";

/// Whether a run only reports pending repairs or writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    ReportOnly,
    Apply,
}

impl RunMode {
    pub fn from_fix_flag(fix: bool) -> Self {
        if fix { Self::Apply } else { Self::ReportOnly }
    }

    pub fn applies(self) -> bool {
        matches!(self, Self::Apply)
    }

    /// Operator-facing label printed in the run header.
    pub fn label(self) -> &'static str {
        match self {
            Self::ReportOnly => "DRY-RUN",
            Self::Apply => "FIX",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The patch actually sent to the store for `entity`.
pub fn write_patch(entity: Entity, patch: &Patch) -> Patch {
    let mut write = patch.clone();
    if entity.stamps_updated_at() {
        write.set_server_timestamp(UPDATED_AT);
    }
    write
}

/// Merge-write `patch` into `collection/id` when `mode` applies.
///
/// Returns whether a write was issued. Empty patches are never written.
pub fn commit_patch<S>(
    store: &mut S,
    mode: RunMode,
    entity: Entity,
    collection: &str,
    id: &str,
    patch: &Patch,
) -> Result<bool, StoreError>
where
    S: DocumentStore + ?Sized,
{
    if !mode.applies() || patch.is_empty() {
        return Ok(false);
    }
    store.merge_write(collection, id, &write_patch(entity, patch))?;
    Ok(true)
}
