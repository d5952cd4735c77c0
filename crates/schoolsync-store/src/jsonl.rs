//! JSONL collection files.
//!
//! A collection of a project mirror is one file of
//! `{"id": ..., "fields": {...}}` lines. Lines starting with `#` are notes
//! left by the exporter; they survive a rewrite and are written back ahead
//! of the documents.

use crate::document::Document;
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Parsed contents of one collection file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionFile {
    pub notes: Vec<String>,
    pub documents: Vec<Document>,
}

impl CollectionFile {
    pub fn parse(text: &str) -> Result<Self, JsonlError> {
        let mut file = Self::default();
        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') {
                file.notes.push(trimmed.to_string());
                continue;
            }
            file.documents.push(parse_document(index + 1, trimmed)?);
        }
        Ok(file)
    }

    pub fn render(&self) -> Result<String, JsonlError> {
        let mut out = String::new();
        for note in &self.notes {
            out.push_str(note);
            out.push('\n');
        }
        for document in &self.documents {
            let line =
                serde_json::to_string(document).map_err(|e| JsonlError::Serialize {
                    id: document.id.clone(),
                    message: e.to_string(),
                })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, JsonlError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| JsonlError::io(path, e))?;
        if bytes.contains(&0) {
            return Err(JsonlError::Corrupt(format!(
                "{}: contains NUL byte(s)",
                path.display()
            )));
        }
        let text = String::from_utf8(bytes).map_err(|_| {
            JsonlError::Corrupt(format!(
                "{}: contains non-UTF-8 byte sequence(s)",
                path.display()
            ))
        })?;
        Self::parse(&text)
    }

    /// Replace the file at `path`: temp file, fsync, rename, then fsync the
    /// directory so the rename itself is durable.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), JsonlError> {
        let path = path.as_ref();
        let rendered = self.render()?;
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent).map_err(|e| JsonlError::io(parent, e))?;
        }

        let tmp_path = tmp_write_path(path);
        let written = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(rendered.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(JsonlError::io(&tmp_path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(JsonlError::Io {
                path: format!("{} -> {}", tmp_path.display(), path.display()),
                message: e.to_string(),
            });
        }

        if let Some(parent) = parent {
            File::open(parent)
                .and_then(|dir| dir.sync_all())
                .map_err(|e| JsonlError::io(parent, e))?;
        }
        Ok(())
    }
}

fn parse_document(line: usize, text: &str) -> Result<Document, JsonlError> {
    let value: Value = serde_json::from_str(text).map_err(|e| JsonlError::Parse {
        line,
        id: None,
        message: e.to_string(),
    })?;
    let id = value.get("id").and_then(Value::as_str).map(str::to_string);
    serde_json::from_value(value).map_err(|e| JsonlError::Parse {
        line,
        id,
        message: e.to_string(),
    })
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

/// Errors from reading or writing collection files.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("{path}: I/O error: {message}")]
    Io { path: String, message: String },

    #[error("line {line}{}: parse error: {message}", document_suffix(.id))]
    Parse {
        line: usize,
        id: Option<String>,
        message: String,
    },

    #[error("document {id}: serialization error: {message}")]
    Serialize { id: String, message: String },

    #[error("corrupted collection file: {0}")]
    Corrupt(String),
}

impl JsonlError {
    fn io(path: &Path, error: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

fn document_suffix(id: &Option<String>) -> String {
    id.as_deref()
        .map(|id| format!(" (document {id})"))
        .unwrap_or_default()
}
