//! Backup management operations
//!
//! Request/result layer over [`BackupManager`] for saving, listing,
//! restoring, diffing and cleaning up a single file's backups.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::backup::{Backup, BackupManager};
use crate::core::diff::{DiffOutcome, diff_bytes};
use crate::core::options::EditOptions;
use crate::core::writer::write_atomic;
use crate::infra::io::read_bytes;

/// Tag given to the snapshot taken right before a restore.
pub const PRE_RESTORE_TAG: &str = "pre-restore";

/// Concise backup info for listings and JSON output
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub tag: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl From<&Backup> for BackupInfo {
    fn from(b: &Backup) -> Self {
        Self {
            name: b.name(),
            tag: b.tag.clone(),
            timestamp: b.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            size_bytes: b.size_bytes,
            path: b.path.clone(),
        }
    }
}

#[derive(Debug)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub tag: Option<String>,
}

#[derive(Debug)]
pub struct RestoreRequest {
    pub path: PathBuf,
    pub tag: Option<String>,
    pub dry_run: bool,
    /// Snapshot the current file first
    pub backup_current: bool,
}

#[derive(Debug, Serialize)]
pub struct RestoreResult {
    pub restored_from: BackupInfo,
    pub pre_restore: Option<BackupInfo>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct DiffRequest {
    pub path: PathBuf,
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiffResult {
    pub backup: BackupInfo,
    pub outcome: DiffOutcome,
}

#[derive(Debug)]
pub struct CleanupRequest {
    pub path: PathBuf,
    pub keep: usize,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct CleanupResult {
    pub removed: Vec<BackupInfo>,
    pub bytes_freed: u64,
}

pub fn save_backup(opts: &EditOptions, req: SaveRequest) -> Result<BackupInfo> {
    let b = BackupManager::new(opts)
        .save(&req.path, req.tag.as_deref())
        .with_context(|| format!("back up {}", req.path.display()))?;
    Ok(BackupInfo::from(&b))
}

/// Backups newest first.
pub fn list_backups(opts: &EditOptions, path: &Path) -> Result<Vec<BackupInfo>> {
    let all = BackupManager::new(opts)
        .list(path)
        .with_context(|| format!("list backups of {}", path.display()))?;
    Ok(all.iter().map(BackupInfo::from).collect())
}

/// Restore a backup. The target is chosen and read before the current file
/// is snapshotted, so eviction triggered by that snapshot cannot remove it.
pub fn restore_backup(opts: &EditOptions, req: RestoreRequest) -> Result<RestoreResult> {
    let mgr = BackupManager::new(opts);
    let (target, bytes) = mgr.diff_target(&req.path, req.tag.as_deref())?;
    let restored_from = BackupInfo::from(&target);

    if req.dry_run {
        return Ok(RestoreResult {
            restored_from,
            pre_restore: None,
            dry_run: true,
        });
    }

    let pre_restore = if req.backup_current && req.path.exists() {
        let snap = mgr
            .save(&req.path, Some(PRE_RESTORE_TAG))
            .context("snapshot current file before restore")?;
        Some(BackupInfo::from(&snap))
    } else {
        None
    };

    write_atomic(&req.path, &bytes)
        .with_context(|| format!("restore {}", req.path.display()))?;
    info!(path = %req.path.display(), from = %restored_from.name, "restored from backup");

    Ok(RestoreResult {
        restored_from,
        pre_restore,
        dry_run: false,
    })
}

/// Compare the chosen backup (old side) with the current file (new side).
pub fn diff_backup(opts: &EditOptions, req: DiffRequest) -> Result<DiffResult> {
    let (backup, old) = BackupManager::new(opts).diff_target(&req.path, req.tag.as_deref())?;
    let current = read_bytes(&req.path)?;
    let outcome = diff_bytes(
        &old,
        current.as_ref(),
        &format!("backup: {}", backup.name()),
        &format!("current: {}", req.path.display()),
    );
    Ok(DiffResult {
        backup: BackupInfo::from(&backup),
        outcome,
    })
}

pub fn cleanup_backups(opts: &EditOptions, req: CleanupRequest) -> Result<CleanupResult> {
    let mgr = BackupManager::new(opts);
    let removed: Vec<Backup> = if req.dry_run {
        mgr.list(&req.path)?.into_iter().skip(req.keep).collect()
    } else {
        mgr.cleanup(&req.path, req.keep)
            .with_context(|| format!("clean up backups of {}", req.path.display()))?
    };
    Ok(CleanupResult {
        bytes_freed: removed.iter().map(|b| b.size_bytes).sum(),
        removed: removed.iter().map(BackupInfo::from).collect(),
    })
}
