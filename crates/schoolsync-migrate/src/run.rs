//! Run driver: the four passes in sequence, with operator-facing progress.
//!
//! Each pass scans its collection once, derives a patch per document, and
//! commits non-empty patches only when the run applies fixes. A store error
//! anywhere aborts the whole run; re-running is the recovery path.

use crate::apply::{RunMode, commit_patch};
use crate::entity::Entity;
use crate::error::MigrateError;
use crate::scan::scan_collection;
use schoolsync_store::{DocumentStore, Patch};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Collection names per record type, for deployments that use their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionNames {
    pub accounts: String,
    pub groups: String,
    pub messages: String,
    pub grades: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            accounts: Entity::Account.default_collection().to_string(),
            groups: Entity::Group.default_collection().to_string(),
            messages: Entity::Message.default_collection().to_string(),
            grades: Entity::Grade.default_collection().to_string(),
        }
    }
}

impl CollectionNames {
    pub fn for_entity(&self, entity: Entity) -> &str {
        match entity {
            Entity::Account => &self.accounts,
            Entity::Group => &self.groups,
            Entity::Message => &self.messages,
            Entity::Grade => &self.grades,
        }
    }
}

/// Everything a run needs besides the store handle.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub project: String,
    pub mode: RunMode,
    /// Per-collection cap on examined documents; `None` scans everything.
    pub limit: Option<usize>,
    pub collections: CollectionNames,
}

impl RunOptions {
    pub fn new(project: impl Into<String>, mode: RunMode) -> Self {
        Self {
            project: project.into(),
            mode,
            limit: None,
            collections: CollectionNames::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchEntry {
    pub id: String,
    pub patch: Patch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub entity: Entity,
    pub collection: String,
    pub examined: usize,
    /// Documents with a non-empty patch, whether or not it was written.
    pub patched: usize,
    pub applied: usize,
    pub entries: Vec<PatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub project: String,
    pub mode: RunMode,
    pub passes: Vec<PassReport>,
    pub total_patched: usize,
}

impl RunReport {
    pub fn total_applied(&self) -> usize {
        self.passes.iter().map(|p| p.applied).sum()
    }

    pub fn pass(&self, entity: Entity) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.entity == entity)
    }
}

/// Run one pass over `collection`, writing progress lines to `out`.
pub fn run_pass<S, W>(
    store: &mut S,
    entity: Entity,
    collection: &str,
    mode: RunMode,
    limit: Option<usize>,
    out: &mut W,
) -> Result<PassReport, MigrateError>
where
    S: DocumentStore + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out)?;
    writeln!(out, "== {collection} ==")?;

    let documents = scan_collection(&*store, collection, limit)?;
    let mut report = PassReport {
        entity,
        collection: collection.to_string(),
        examined: documents.len(),
        patched: 0,
        applied: 0,
        entries: Vec::new(),
    };

    for document in documents {
        let patch = entity.normalize(&document.fields);
        if patch.is_empty() {
            continue;
        }
        report.patched += 1;
        writeln!(out, "{collection}/{} -> {patch}", document.id)?;
        if commit_patch(store, mode, entity, collection, &document.id, &patch)? {
            report.applied += 1;
        }
        report.entries.push(PatchEntry {
            id: document.id,
            patch,
        });
    }

    writeln!(out, "{collection} fixes: {}", report.patched)?;
    Ok(report)
}

/// Run all passes in order against `store`.
pub fn run_migration<S, W>(
    store: &mut S,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunReport, MigrateError>
where
    S: DocumentStore + ?Sized,
    W: Write + ?Sized,
{
    writeln!(
        out,
        "Project: {}  mode: {}",
        options.project,
        options.mode.label()
    )?;

    let mut passes = Vec::with_capacity(Entity::ALL.len());
    for entity in Entity::ALL {
        let collection = options.collections.for_entity(entity);
        passes.push(run_pass(
            store,
            entity,
            collection,
            options.mode,
            options.limit,
            out,
        )?);
    }

    writeln!(out)?;
    writeln!(out, "Done.")?;

    let total_patched = passes.iter().map(|p| p.patched).sum();
    Ok(RunReport {
        project: options.project.clone(),
        mode: options.mode,
        passes,
        total_patched,
    })
}
