//! Per-file timestamped backups kept next to the edited file.
//!
//! Layout: `<dir-of-file>/<backup_dir>/<filename>.<YYYYMMDD_HHMMSS_micros>[.<tag>]`.
//! Everything needed to order and select a backup is in its name, so listing
//! never depends on directory order or file mtimes. Backups are byte-exact
//! copies of the file and are written with the same atomic discipline as edits.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta, Timelike};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::core::error::LineEditError;
use crate::core::options::EditOptions;
use crate::core::writer::write_atomic;
use crate::infra::io::read_bytes;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
// "YYYYMMDD_HHMMSS_ffffff"
const STAMP_LEN: usize = 22;

/// One stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
    pub original_path: PathBuf,
    pub path: PathBuf,
    pub tag: Option<String>,
    pub timestamp: NaiveDateTime,
    pub size_bytes: u64,
}

impl Backup {
    /// File name of the backup entry.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Stored bytes, exactly as they were saved.
    pub fn read(&self) -> Result<Vec<u8>, LineEditError> {
        read_bytes(&self.path).map(|b| b.into_vec())
    }
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    dir_name: String,
    max_backups: usize,
}

impl BackupManager {
    pub fn new(opts: &EditOptions) -> Self {
        Self {
            dir_name: opts.backup_dir.clone(),
            max_backups: opts.max_backups,
        }
    }

    /// Backup directory for `path`: a sibling of the file.
    pub fn backup_dir_for(&self, path: &Path) -> PathBuf {
        match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.join(&self.dir_name),
            _ => PathBuf::from(&self.dir_name),
        }
    }

    /// Snapshot the current bytes of `path`, then evict beyond the cap.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path, tag: Option<&str>) -> Result<Backup, LineEditError> {
        let bytes = read_bytes(path)?;
        let dir = self.backup_dir_for(path);
        fs::create_dir_all(&dir).map_err(|e| LineEditError::io("create backup directory", &dir, e))?;

        let tag = tag.and_then(sanitize_tag);
        let newest = self.list(path)?.first().map(|b| b.timestamp);
        let timestamp = next_stamp(Local::now().naive_local(), newest);

        let mut name = format!("{}.{}", file_name(path), format_stamp(timestamp));
        if let Some(t) = &tag {
            name.push('.');
            name.push_str(t);
        }
        let backup_path = dir.join(name);
        write_atomic(&backup_path, bytes.as_ref())?;

        let backup = Backup {
            original_path: path.to_path_buf(),
            path: backup_path,
            tag,
            timestamp,
            size_bytes: bytes.as_ref().len() as u64,
        };
        info!(backup = %backup.name(), size = backup.size_bytes, "backup saved");

        if self.max_backups > 0 {
            self.cleanup(path, self.max_backups)?;
        }
        Ok(backup)
    }

    /// Backups of `path`, newest first. A missing backup directory is empty.
    pub fn list(&self, path: &Path) -> Result<Vec<Backup>, LineEditError> {
        let dir = self.backup_dir_for(path);
        let entries = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LineEditError::io("read backup directory", &dir, e)),
        };

        let prefix = format!("{}.", file_name(path));
        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LineEditError::io("read backup directory", &dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name.strip_prefix(&prefix) else { continue };
            let Some((timestamp, tag)) = parse_entry(rest) else {
                debug!(entry = name, "ignoring unrecognized backup entry");
                continue;
            };
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            backups.push(Backup {
                original_path: path.to_path_buf(),
                path: entry.path(),
                tag,
                timestamp,
                size_bytes,
            });
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.path.cmp(&a.path)));
        Ok(backups)
    }

    /// Newest backup, or newest with exactly `tag`.
    pub fn select(&self, path: &Path, tag: Option<&str>) -> Result<Backup, LineEditError> {
        let wanted = tag.and_then(sanitize_tag);
        self.list(path)?
            .into_iter()
            .find(|b| wanted.is_none() || b.tag == wanted)
            .ok_or_else(|| LineEditError::BackupNotFound {
                path: path.to_path_buf(),
                tag: tag.map(str::to_owned),
            })
    }

    /// The chosen backup and its bytes, for comparison against the file.
    pub fn diff_target(
        &self,
        path: &Path,
        tag: Option<&str>,
    ) -> Result<(Backup, Vec<u8>), LineEditError> {
        let backup = self.select(path, tag)?;
        let bytes = backup.read()?;
        Ok((backup, bytes))
    }

    /// Overwrite `path` with the chosen backup's bytes.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn restore(&self, path: &Path, tag: Option<&str>) -> Result<Backup, LineEditError> {
        let (backup, bytes) = self.diff_target(path, tag)?;
        write_atomic(path, &bytes)?;
        info!(backup = %backup.name(), "restored");
        Ok(backup)
    }

    /// Keep the newest `keep` backups of `path`; return the removed ones.
    pub fn cleanup(&self, path: &Path, keep: usize) -> Result<Vec<Backup>, LineEditError> {
        let stale: Vec<Backup> = self.list(path)?.into_iter().skip(keep).collect();
        for b in &stale {
            fs::remove_file(&b.path).map_err(|e| LineEditError::io("remove backup", &b.path, e))?;
            debug!(backup = %b.name(), "evicted");
        }
        Ok(stale)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".into())
}

/// Restrict a tag to ASCII alphanumerics, `-` and `_`. Blank tags are none.
pub fn sanitize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return None;
    }
    Some(
        tag.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect(),
    )
}

fn format_stamp(ts: NaiveDateTime) -> String {
    ts.format("%Y%m%d_%H%M%S_%6f").to_string()
}

/// `now` at microsecond precision, bumped past `newest` if needed.
fn next_stamp(now: NaiveDateTime, newest: Option<NaiveDateTime>) -> NaiveDateTime {
    let now = now.trunc_subsecs(6);
    match newest {
        Some(n) if now <= n => n + TimeDelta::microseconds(1),
        _ => now,
    }
}

/// Parse `<stamp>[.<tag>]`.
fn parse_entry(rest: &str) -> Option<(NaiveDateTime, Option<String>)> {
    let (stamp, tag) = match rest.split_once('.') {
        Some((s, t)) => (s, Some(t)),
        None => (rest, None),
    };
    if stamp.len() != STAMP_LEN || !stamp.is_ascii() || stamp.as_bytes()[15] != b'_' {
        return None;
    }
    let micros = &stamp[16..];
    if !micros.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let base = NaiveDateTime::parse_from_str(&stamp[..15], STAMP_FORMAT).ok()?;
    let ts = base.with_nanosecond(micros.parse::<u32>().ok()? * 1_000)?;

    match tag {
        None => Some((ts, None)),
        Some(t) if sanitize_tag(t).as_deref() == Some(t) => Some((ts, Some(t.to_owned()))),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn manager(max: usize) -> BackupManager {
        BackupManager::new(&EditOptions {
            max_backups: max,
            ..EditOptions::default()
        })
    }

    #[test]
    fn stamp_round_trips_through_name() {
        let ts = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 3, 42)
            .unwrap();
        let name = format_stamp(ts);
        assert_eq!(name, "20250309_070503_000042");
        assert_eq!(parse_entry(&name), Some((ts, None)));
        assert_eq!(
            parse_entry(&format!("{name}.before-fix")),
            Some((ts, Some("before-fix".into())))
        );
        assert_eq!(parse_entry("20250309_0705"), None);
        assert_eq!(parse_entry(&format!("{name}.bad tag")), None);
    }

    #[test]
    fn stamps_strictly_increase() {
        let t = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_micro_opt(0, 0, 0, 5)
            .unwrap();
        assert_eq!(next_stamp(t, Some(t)), t + TimeDelta::microseconds(1));
        let later = t + TimeDelta::seconds(1);
        assert_eq!(next_stamp(later, Some(t)), later);
    }

    #[test]
    fn tags_are_sanitized() {
        assert_eq!(sanitize_tag("pre restore/1"), Some("pre_restore_1".into()));
        assert_eq!(sanitize_tag("  "), None);
        assert_eq!(sanitize_tag("ok-tag_2"), Some("ok-tag_2".into()));
    }

    #[test]
    fn save_list_select_and_evict() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        let mgr = manager(2);

        fs::write(&file, "one").unwrap();
        let first = mgr.save(&file, Some("first")).unwrap();
        fs::write(&file, "two").unwrap();
        mgr.save(&file, None).unwrap();
        fs::write(&file, "three").unwrap();
        let third = mgr.save(&file, None).unwrap();

        let all = mgr.list(&file).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], third);
        assert!(all[0].timestamp > all[1].timestamp);
        assert!(!first.path.exists());
        assert!(matches!(
            mgr.select(&file, Some("first")),
            Err(LineEditError::BackupNotFound { .. })
        ));
        assert_eq!(mgr.select(&file, None).unwrap().read().unwrap(), b"three");
    }

    #[test]
    fn restore_by_tag_and_ignore_strangers() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        let mgr = manager(0);

        fs::write(&file, "v1").unwrap();
        mgr.save(&file, Some("v1")).unwrap();
        fs::write(&file, "v2").unwrap();
        mgr.save(&file, None).unwrap();
        fs::write(&file, "v3").unwrap();

        let bdir = mgr.backup_dir_for(&file);
        fs::write(bdir.join("notes.md.garbage"), "x").unwrap();
        fs::write(bdir.join("other.md.20250101_000000_000000"), "x").unwrap();
        assert_eq!(mgr.list(&file).unwrap().len(), 2);

        let used = mgr.restore(&file, Some("v1")).unwrap();
        assert_eq!(used.tag.as_deref(), Some("v1"));
        assert_eq!(fs::read(&file).unwrap(), b"v1");

        mgr.restore(&file, None).unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"v2");
    }

    #[test]
    fn cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("c.txt");
        let mgr = manager(0);
        fs::write(&file, "x").unwrap();
        for _ in 0..4 {
            mgr.save(&file, None).unwrap();
        }
        let removed = mgr.cleanup(&file, 1).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(mgr.list(&file).unwrap().len(), 1);
    }

    #[test]
    fn save_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = manager(20).save(&dir.path().join("gone.txt"), None).unwrap_err();
        assert!(matches!(err, LineEditError::FileNotFound(_)));
    }
}
