//! # schoolsync-migrate
//!
//! Idempotent repair passes over the school app's document database.
//!
//! ## Architecture
//!
//! ```text
//! scan_collection        ← snapshot (id, fields) pairs, optionally capped
//!     │
//! Entity::normalize      ← pure: fields → Patch (empty = already canonical)
//!     │
//! commit_patch           ← effectful: merge-write, only in apply mode
//!     │
//! run_migration          ← accounts, groups, messages, grades in order
//! ```
//!
//! Every rule only fires while its trigger condition holds, and the patch it
//! produces removes that condition, so a second run over repaired data
//! derives nothing.

pub mod account;
pub mod apply;
pub mod entity;
pub mod error;
pub mod grade;
pub mod group;
pub mod message;
pub mod run;
pub mod scan;
pub mod timestamp;

pub use account::normalize_account;
pub use apply::{RunMode, UPDATED_AT, commit_patch, write_patch};
pub use entity::Entity;
pub use error::MigrateError;
pub use grade::normalize_grade;
pub use group::normalize_group;
pub use message::{conversation_key, normalize_message};
pub use run::{
    CollectionNames, PassReport, PatchEntry, RunOptions, RunReport, run_migration, run_pass,
};
pub use scan::{cap_to_limit, scan_collection};
pub use timestamp::{parse_date_string, to_timestamp};
