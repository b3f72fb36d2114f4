//! Integration tests for backup save, eviction and restore flows.

use std::{fs, path::Path};

use lineedit::core::{
    EditOperation, EditOptions, LineRange,
    apply::{ApplyRequest, apply},
    backup::BackupManager,
    backup_ops::{CleanupRequest, RestoreRequest, cleanup_backups, restore_backup},
};
use tempfile::tempdir;

fn edit(
    path: &Path,
    op: EditOperation,
    opts: &EditOptions,
)
{
    apply(&ApplyRequest::new(path, op), opts).unwrap();
}

#[test]
fn restore_after_three_edits_is_byte_identical()
{
    let tmp = tempdir().unwrap();
    let path = tmp
        .path()
        .join("config.ini");
    let original = b"\xEF\xBB\xBF[main]\r\nkey=1\r\nother=2".to_vec();
    fs::write(&path, &original).unwrap();

    let opts = EditOptions::default();
    let mgr = BackupManager::new(&opts);
    mgr.save(&path, Some("baseline"))
        .unwrap();

    edit(
        &path,
        EditOperation::Replace { range: LineRange::single(2), new_lines: vec!["key=9".into()] },
        &opts,
    );
    edit(&path, EditOperation::Append { after: 3, new_lines: vec!["new=3".into()] }, &opts);
    edit(&path, EditOperation::Delete { range: LineRange::single(1) }, &opts);
    assert_ne!(fs::read(&path).unwrap(), original);

    // Each edit also saved a backup; the tag picks the hand-made one.
    assert_eq!(
        mgr.list(&path)
            .unwrap()
            .len(),
        4
    );
    mgr.restore(&path, Some("baseline"))
        .unwrap();
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn untagged_restore_uses_most_recent_snapshot()
{
    let tmp = tempdir().unwrap();
    let path = tmp
        .path()
        .join("a.txt");
    fs::write(&path, "one\ntwo\n").unwrap();
    let opts = EditOptions::default();

    edit(
        &path,
        EditOperation::Replace { range: LineRange::single(1), new_lines: vec!["ONE".into()] },
        &opts,
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "ONE\ntwo\n");

    BackupManager::new(&opts)
        .restore(&path, None)
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
}

#[test]
fn cap_of_two_evicts_oldest()
{
    let tmp = tempdir().unwrap();
    let path = tmp
        .path()
        .join("b.txt");
    let opts = EditOptions { max_backups: 2, ..EditOptions::default() };
    let mgr = BackupManager::new(&opts);

    for body in ["v1", "v2", "v3"]
    {
        fs::write(&path, body).unwrap();
        mgr.save(&path, None)
            .unwrap();
    }

    let list = mgr
        .list(&path)
        .unwrap();
    assert_eq!(list.len(), 2);
    assert!(list[0].timestamp > list[1].timestamp);
    assert_eq!(list[0].read().unwrap(), b"v3");
    assert_eq!(list[1].read().unwrap(), b"v2");

    let on_disk = fs::read_dir(mgr.backup_dir_for(&path))
        .unwrap()
        .count();
    assert_eq!(on_disk, 2);
}

#[test]
fn backups_live_next_to_the_file_under_configured_dir()
{
    let tmp = tempdir().unwrap();
    let sub = tmp
        .path()
        .join("nested/dir");
    fs::create_dir_all(&sub).unwrap();
    let path = sub.join("x.rs");
    fs::write(&path, "fn main() {}\n").unwrap();

    let opts = EditOptions { backup_dir: ".snapshots".into(), ..EditOptions::default() };
    let b = BackupManager::new(&opts)
        .save(&path, Some("before refactor"))
        .unwrap();

    assert_eq!(b.path.parent().unwrap(), sub.join(".snapshots"));
    let name = b.name();
    assert!(name.starts_with("x.rs."));
    assert!(name.ends_with(".before_refactor"));
}

#[test]
fn restore_with_pre_restore_snapshot_and_cleanup()
{
    let tmp = tempdir().unwrap();
    let path = tmp
        .path()
        .join("c.txt");
    let opts = EditOptions::default();
    fs::write(&path, "good\n").unwrap();
    BackupManager::new(&opts)
        .save(&path, None)
        .unwrap();
    fs::write(&path, "bad\n").unwrap();

    let res = restore_backup(
        &opts,
        RestoreRequest { path: path.clone(), tag: None, dry_run: false, backup_current: true },
    )
    .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "good\n");
    assert!(res.pre_restore.is_some());

    let cleaned = cleanup_backups(&opts, CleanupRequest { path: path.clone(), keep: 1, dry_run: false })
        .unwrap();
    assert_eq!(cleaned.removed.len(), 1);
    assert_eq!(cleaned.bytes_freed, 5);
}
