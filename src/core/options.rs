//! Immutable options threaded into every core entry point.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOptions {
    /// Name of the backup directory created next to each edited file.
    pub backup_dir: String,
    /// Backups kept per file; `0` disables eviction.
    pub max_backups: usize,
    /// Widest delete allowed without `force`.
    pub large_delete_threshold: usize,
    /// Treat a missing target as an empty file instead of failing.
    pub create_if_missing: bool,
    /// Snapshot the file before every mutating edit.
    pub auto_backup: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            backup_dir: ".aibackup".into(),
            max_backups: 20,
            large_delete_threshold: 50,
            create_if_missing: false,
            auto_backup: true,
        }
    }
}
