//! Edit pipeline: load, validate and mutate, back up, write.
//!
//! Nothing touches disk until the edit has been validated and the new
//! contents encoded, so an invalid range or an unencodable character leaves
//! both the file and its backup directory untouched.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use crate::core::backup::{Backup, BackupManager};
use crate::core::edit::{EditEngine, EditOperation, LineRange};
use crate::core::error::LineEditError;
use crate::core::line_store::LineStore;
use crate::core::options::EditOptions;
use crate::core::writer::write_atomic;

#[derive(Debug, Clone)]
pub struct ApplyRequest<'a> {
    pub path: &'a Path,
    pub op: EditOperation,
    /// Bypass the large-delete guard.
    pub force: bool,
    /// Snapshot before writing (still subject to `EditOptions::auto_backup`).
    pub backup: bool,
    pub dry_run: bool,
    /// Treat literal `\n` in new content as a line break.
    pub expand_escapes: bool,
}

impl<'a> ApplyRequest<'a> {
    pub fn new(path: &'a Path, op: EditOperation) -> Self {
        Self {
            path,
            op,
            force: false,
            backup: true,
            dry_run: false,
            expand_escapes: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub path: PathBuf,
    pub op: &'static str,
    #[serde(skip)]
    verb: &'static str,
    /// Lines addressed by the operation, numbered before the edit.
    pub target: LineRange,
    pub lines_removed: usize,
    pub lines_added: usize,
    pub lines_before: usize,
    pub lines_after: usize,
    pub backup: Option<Backup>,
    pub created: bool,
    pub dry_run: bool,
    pub bytes_written: usize,
}

impl ApplyReport {
    /// One-line human summary, e.g.
    /// `replaced lines 2-2 with 2 line(s) in a.txt (backup saved)`.
    pub fn summary(&self) -> String {
        let what = match self.op {
            "replace" => format!(
                "{} lines {} with {} line(s)",
                self.verb, self.target, self.lines_added
            ),
            "insert" => format!(
                "{} {} line(s) before line {}",
                self.verb, self.lines_added, self.target.start
            ),
            "append" => format!(
                "{} {} line(s) after line {}",
                self.verb, self.lines_added, self.target.start
            ),
            _ => format!(
                "{} lines {} ({} line(s))",
                self.verb, self.target, self.lines_removed
            ),
        };
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        let note = if self.dry_run {
            "dry run, nothing written"
        } else if self.backup.is_some() {
            "backup saved"
        } else if self.created {
            "new file"
        } else {
            "no backup"
        };
        format!("{what} in {name} ({note})")
    }
}

fn target_of(op: &EditOperation) -> LineRange {
    match op {
        EditOperation::Replace { range, .. } | EditOperation::Delete { range } => *range,
        EditOperation::Insert { before, .. } => LineRange::single(*before),
        EditOperation::Append { after, .. } => LineRange::single(*after),
    }
}

/// Run one edit against `req.path`.
#[instrument(level = "debug", skip_all, fields(path = %req.path.display(), op = req.op.name()))]
pub fn apply(req: &ApplyRequest<'_>, opts: &EditOptions) -> Result<ApplyReport, LineEditError> {
    let created = !req.path.exists();
    let store = LineStore::load_or_create(req.path, opts.create_if_missing)?;

    let outcome = EditEngine::from_options(opts)
        .with_force(req.force)
        .with_escapes(req.expand_escapes)
        .apply_detailed(&store, &req.op)?;
    let bytes = outcome.store.encode()?;

    let mut report = ApplyReport {
        path: req.path.to_path_buf(),
        op: req.op.name(),
        verb: req.op.verb(),
        target: target_of(&req.op),
        lines_removed: outcome.lines_removed,
        lines_added: outcome.lines_added,
        lines_before: store.len(),
        lines_after: outcome.store.len(),
        backup: None,
        created,
        dry_run: req.dry_run,
        bytes_written: 0,
    };
    if req.dry_run {
        return Ok(report);
    }

    // A failed snapshot aborts the edit.
    if req.backup && opts.auto_backup && !created {
        report.backup = Some(BackupManager::new(opts).save(req.path, None)?);
    }

    write_atomic(req.path, &bytes)?;
    report.bytes_written = bytes.len();
    info!(
        removed = report.lines_removed,
        added = report.lines_added,
        lines = report.lines_after,
        "edit written"
    );
    Ok(report)
}
