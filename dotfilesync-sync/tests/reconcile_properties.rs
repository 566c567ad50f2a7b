use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

use dotfilesync_core::{ManifestEntry, TrackedPath};
use dotfilesync_sync::{
    copy_dir, fingerprint, inspect, pipeline::apply, reconcile, Excludes, SyncDecision, SyncError,
};

fn pair(tmp: &TempDir, name: &str) -> (PathBuf, PathBuf) {
    let live = tmp.path().join(name);
    let backup_root = tmp.path().join(".sync");
    fs::create_dir_all(&backup_root).expect("backup root");
    (live, backup_root.join(name))
}

fn tracked_file(live: &Path, backup: &Path, name: &str) -> TrackedPath {
    TrackedPath {
        entry: ManifestEntry::file(name),
        live: live.to_path_buf(),
        backup: backup.to_path_buf(),
    }
}

fn set_age(path: &Path, secs_ago: u64) {
    let ts = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(secs_ago));
    set_file_mtime(path, ts).expect("set mtime");
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn identical_bytes_are_in_sync_regardless_of_timestamps() {
    let tmp = TempDir::new().expect("tmp");
    let (live, backup) = pair(&tmp, ".bashrc");
    fs::write(&live, "alias ll='ls -l'\n").expect("live");
    fs::write(&backup, "alias ll='ls -l'\n").expect("backup");
    set_age(&live, 10);
    set_age(&backup, 3600);

    assert_eq!(reconcile(&live, &backup).expect("reconcile"), SyncDecision::InSync);

    let before = fs::metadata(&backup).unwrap().modified().unwrap();
    let stats = apply(
        SyncDecision::InSync,
        &tracked_file(&live, &backup, ".bashrc"),
        &Excludes::default(),
    )
    .expect("apply");
    assert!(stats.is_none(), "in-sync apply must be a no-op");
    assert_eq!(fs::metadata(&backup).unwrap().modified().unwrap(), before);
}

// ---------------------------------------------------------------------------
// Restoration / backup creation / both absent
// ---------------------------------------------------------------------------

#[test]
fn missing_live_is_restored_from_backup() {
    let tmp = TempDir::new().expect("tmp");
    let (live, backup) = pair(&tmp, ".vimrc");
    fs::write(&backup, "set number\n").expect("backup");

    let decision = reconcile(&live, &backup).expect("reconcile");
    assert_eq!(decision, SyncDecision::CopyBackupToLive);

    apply(decision, &tracked_file(&live, &backup, ".vimrc"), &Excludes::default())
        .expect("apply");
    assert_eq!(fs::read_to_string(&live).unwrap(), "set number\n");
    assert_eq!(reconcile(&live, &backup).expect("reconcile"), SyncDecision::InSync);
}

#[test]
fn missing_backup_is_created_from_live() {
    let tmp = TempDir::new().expect("tmp");
    let live = tmp.path().join(".config/git/config");
    let backup = tmp.path().join(".sync/.config/git/config");
    fs::create_dir_all(live.parent().unwrap()).unwrap();
    fs::write(&live, "[user]\n\tname = me\n").expect("live");

    let decision = reconcile(&live, &backup).expect("reconcile");
    assert_eq!(decision, SyncDecision::CopyLiveToBackup);

    apply(
        decision,
        &tracked_file(&live, &backup, ".config/git/config"),
        &Excludes::default(),
    )
    .expect("apply creates missing parents");
    assert_eq!(fs::read(&backup).unwrap(), fs::read(&live).unwrap());
    assert_eq!(reconcile(&live, &backup).expect("reconcile"), SyncDecision::InSync);
}

#[test]
fn both_absent_is_in_sync_without_error() {
    let tmp = TempDir::new().expect("tmp");
    let (live, backup) = pair(&tmp, ".absent");
    assert_eq!(reconcile(&live, &backup).expect("reconcile"), SyncDecision::InSync);
}

// ---------------------------------------------------------------------------
// Newer wins
// ---------------------------------------------------------------------------

#[test]
fn newer_live_overwrites_older_backup() {
    let tmp = TempDir::new().expect("tmp");
    let (live, backup) = pair(&tmp, ".bashrc");
    fs::write(&live, "A").expect("live");
    fs::write(&backup, "B").expect("backup");
    set_age(&backup, 7200);
    set_age(&live, 60);

    let decision = reconcile(&live, &backup).expect("reconcile");
    assert_eq!(decision, SyncDecision::CopyLiveToBackup);

    apply(decision, &tracked_file(&live, &backup, ".bashrc"), &Excludes::default())
        .expect("apply");
    assert_eq!(fs::read_to_string(&backup).unwrap(), "A");
    assert_eq!(
        fingerprint::hash_file(&live).unwrap(),
        fingerprint::hash_file(&backup).unwrap()
    );
    assert_eq!(reconcile(&live, &backup).expect("reconcile"), SyncDecision::InSync);
}

#[test]
fn newer_backup_overwrites_older_live() {
    let tmp = TempDir::new().expect("tmp");
    let (live, backup) = pair(&tmp, ".zshrc");
    fs::write(&live, "old").expect("live");
    fs::write(&backup, "new").expect("backup");
    set_age(&live, 7200);
    set_age(&backup, 60);

    let decision = reconcile(&live, &backup).expect("reconcile");
    assert_eq!(decision, SyncDecision::CopyBackupToLive);

    apply(decision, &tracked_file(&live, &backup, ".zshrc"), &Excludes::default())
        .expect("apply");
    assert_eq!(fs::read_to_string(&live).unwrap(), "new");
    assert_eq!(reconcile(&live, &backup).expect("reconcile"), SyncDecision::InSync);
}

#[test]
fn equal_timestamps_with_different_content_keep_live_and_flag_drift() {
    let tmp = TempDir::new().expect("tmp");
    let (live, backup) = pair(&tmp, ".profile");
    fs::write(&live, "live").expect("live");
    fs::write(&backup, "backup").expect("backup");
    let ts = FileTime::from_unix_time(1_700_000_000, 0);
    set_file_mtime(&live, ts).unwrap();
    set_file_mtime(&backup, ts).unwrap();

    let r = inspect(&live, &backup, &Excludes::default()).expect("inspect");
    assert_eq!(r.decision, SyncDecision::CopyLiveToBackup);
    assert!(r.timestamp_tie);
}

// ---------------------------------------------------------------------------
// Directories
// ---------------------------------------------------------------------------

#[test]
fn directory_copy_omits_vcs_metadata_and_copies_siblings() {
    let tmp = TempDir::new().expect("tmp");
    let src = tmp.path().join("nvim");
    fs::create_dir_all(src.join(".git/objects")).unwrap();
    fs::write(src.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
    fs::create_dir_all(src.join(".hg")).unwrap();
    fs::create_dir_all(src.join("lua")).unwrap();
    fs::write(src.join("init.lua"), b"vim.o.number = true\n").unwrap();
    fs::write(src.join("lua/keys.lua"), b"\x00\x01binary-ish\xff").unwrap();

    let dst = tmp.path().join(".sync/nvim");
    let stats = copy_dir(&src, &dst, &Excludes::default()).expect("copy_dir");

    assert_eq!(stats.files, 2);
    assert_eq!(stats.skipped_dirs, 2);
    assert!(!dst.join(".git").exists());
    assert!(!dst.join(".hg").exists());
    assert_eq!(fs::read(dst.join("init.lua")).unwrap(), fs::read(src.join("init.lua")).unwrap());
    assert_eq!(
        fs::read(dst.join("lua/keys.lua")).unwrap(),
        fs::read(src.join("lua/keys.lua")).unwrap()
    );
}

#[test]
fn directory_pair_reconciles_by_tree_content() {
    let tmp = TempDir::new().expect("tmp");
    let live = tmp.path().join("nvim");
    let backup = tmp.path().join(".sync/nvim");
    fs::create_dir_all(&live).unwrap();
    fs::write(live.join("init.lua"), "v1").unwrap();

    assert_eq!(reconcile(&live, &backup).unwrap(), SyncDecision::CopyLiveToBackup);
    copy_dir(&live, &backup, &Excludes::default()).unwrap();
    assert_eq!(reconcile(&live, &backup).unwrap(), SyncDecision::InSync);

    // A .git directory on one side alone does not break the match.
    fs::create_dir_all(live.join(".git")).unwrap();
    fs::write(live.join(".git/HEAD"), "x").unwrap();
    assert_eq!(reconcile(&live, &backup).unwrap(), SyncDecision::InSync);

    fs::write(backup.join("init.lua"), "v2").unwrap();
    set_age(&live.join("init.lua"), 3600);
    assert_eq!(reconcile(&live, &backup).unwrap(), SyncDecision::CopyBackupToLive);
}

#[test]
#[cfg(unix)]
fn directory_copy_fails_fast_on_third_of_five_files() {
    let tmp = TempDir::new().expect("tmp");
    let src = tmp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.conf"), "a").unwrap();
    fs::write(src.join("b.conf"), "b").unwrap();
    // Not a regular file: the copier must refuse it.
    std::os::unix::fs::symlink(src.join("missing-target"), src.join("c.conf")).unwrap();
    fs::write(src.join("d.conf"), "d").unwrap();
    fs::write(src.join("e.conf"), "e").unwrap();

    let dst = tmp.path().join("dst");
    let err = copy_dir(&src, &dst, &Excludes::default()).unwrap_err();

    match &err {
        SyncError::NotRegularFile { path } => assert_eq!(path, &src.join("c.conf")),
        other => panic!("expected NotRegularFile, got {other:?}"),
    }
    assert!(err.to_string().contains("c.conf"));
    assert!(dst.join("a.conf").exists());
    assert!(dst.join("b.conf").exists());
    assert!(!dst.join("d.conf").exists(), "siblings after the failure must not be copied");
    assert!(!dst.join("e.conf").exists());
}

#[test]
fn example_bashrc_scenario() {
    let tmp = TempDir::new().expect("tmp");
    let live = tmp.path().join(".bashrc");
    let backup = tmp.path().join(".sync/.bashrc");
    fs::create_dir_all(backup.parent().unwrap()).unwrap();
    fs::write(&live, "A").unwrap();
    fs::write(&backup, "B").unwrap();
    set_file_mtime(&backup, FileTime::from_unix_time(1_000, 0)).unwrap(); // T1
    set_file_mtime(&live, FileTime::from_unix_time(2_000, 0)).unwrap(); // T2

    let decision = reconcile(&live, &backup).unwrap();
    assert_eq!(decision, SyncDecision::CopyLiveToBackup);
    apply(decision, &tracked_file(&live, &backup, ".bashrc"), &Excludes::default()).unwrap();
    assert_eq!(fs::read_to_string(&backup).unwrap(), "A");
}
