//! Error types for repair runs.

use schoolsync_store::StoreError;

/// Errors that abort a run.
///
/// Malformed field values are never errors; they only leave a field unrepaired.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The store could not be read or rejected a write.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Progress output could not be written.
    #[error("failed to write run output: {0}")]
    Output(#[from] std::io::Error),
}
