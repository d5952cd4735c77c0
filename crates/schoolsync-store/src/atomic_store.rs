//! Lock-scoped atomic mutation helpers for JSONL collection files.

use crate::collection::Collection;
use crate::store::StoreError;
use chrono::Utc;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn collection_lock_path(collection_path: &Path) -> PathBuf {
    let mut path: OsString = collection_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

/// Execute one lock-scoped mutation against a collection JSONL path.
///
/// The mutator returns `(value, changed)`; `changed=true` persists the
/// collection before the lock is released. A missing file starts empty.
pub fn mutate_collection_jsonl<T, F>(path: impl AsRef<Path>, mutator: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut Collection) -> (T, bool),
{
    let path = path.as_ref();
    let _guard = CollectionLockGuard::acquire(path)?;

    let mut collection = if path.exists() {
        Collection::load_jsonl(path)?
    } else {
        Collection::default()
    };
    let (value, changed) = mutator(&mut collection);
    if changed {
        collection.save_jsonl(path)?;
    }
    Ok(value)
}

struct CollectionLockGuard {
    lock_path: PathBuf,
    _file: File,
}

impl CollectionLockGuard {
    fn acquire(path: &Path) -> Result<Self, StoreError> {
        let lock_path = collection_lock_path(path);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let _ = writeln!(
                    file,
                    "pid={}\nutc={}",
                    std::process::id(),
                    Utc::now().to_rfc3339()
                );
                Ok(Self {
                    lock_path,
                    _file: file,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::LockBusy {
                    lock_path: lock_path.display().to_string(),
                })
            }
            Err(err) => Err(StoreError::LockIo {
                lock_path: lock_path.display().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

impl Drop for CollectionLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
