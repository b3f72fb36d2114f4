//! Atomic file replacement.
//!
//! Bytes go to a temp file in the target's directory, are fsynced, take over
//! the target's permissions and are renamed over it. A failure at any step
//! leaves the target as it was; the temp file is removed when dropped.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::core::error::LineEditError;
use crate::core::line_store::LineStore;

/// Encode `store` and atomically replace its source file.
#[instrument(level = "debug", skip(store), fields(path = %store.source_path().display()))]
pub fn write_store(store: &LineStore) -> Result<usize, LineEditError> {
    let bytes = store.encode()?;
    write_atomic(store.source_path(), &bytes)?;
    Ok(bytes.len())
}

/// Write `data` to `path` via temp-file-then-rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), LineEditError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Existing permissions win; new files get 0644.
    #[cfg(unix)]
    let perms = fs::metadata(path)
        .map(|m| m.permissions())
        .unwrap_or_else(|_| std::os::unix::fs::PermissionsExt::from_mode(0o644));
    #[cfg(not(unix))]
    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let mut tmp = tempfile::Builder::new()
        .prefix(".lineedit-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| LineEditError::io("create temp file in", dir, e))?;

    tmp.write_all(data)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| LineEditError::io("write temp file for", path, e))?;

    #[cfg(unix)]
    fs::set_permissions(tmp.path(), perms)
        .map_err(|e| LineEditError::io("set permissions for", path, e))?;
    #[cfg(not(unix))]
    if let Some(perms) = perms {
        fs::set_permissions(tmp.path(), perms)
            .map_err(|e| LineEditError::io("set permissions for", path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| LineEditError::io("replace", path, e.error))?;

    if let Err(e) = sync_dir(dir) {
        warn!(dir = %dir.display(), error = %e, "directory fsync failed");
    }
    debug!(path = %path.display(), bytes = data.len(), "atomic write committed");
    Ok(())
}

/// Make the rename durable.
#[cfg(unix)]
fn sync_dir(p: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let f = fs::OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_DIRECTORY)
        .open(p)?;
    f.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_p: &Path) -> std::io::Result<()> {
    // No reliable directory fsync here.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, b"old").unwrap();

        write_atomic(&path, b"new contents").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new contents");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        write_atomic(&path, b"#!/bin/sh\necho hi\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);

        let fresh = dir.path().join("fresh.txt");
        write_atomic(&fresh, b"x").unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/f.txt");
        assert!(matches!(
            write_atomic(&path, b"x"),
            Err(LineEditError::Io { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn write_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"x\r\ny").unwrap();
        let store = LineStore::load(&path).unwrap();
        let n = write_store(&store).unwrap();
        assert_eq!(n, 4);
        assert_eq!(fs::read(&path).unwrap(), b"x\r\ny");
    }

    #[cfg(unix)]
    #[test]
    fn directory_sync_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sync_dir(dir.path()).is_ok());
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }
}
