//! Reconciler: turns a live path and a backup path into a sync decision.
//!
//! Decision order:
//! 1. Neither side exists → `InSync` (nothing to do)
//! 2. Only backup exists → `CopyBackupToLive`
//! 3. Only live exists → `CopyLiveToBackup`
//! 4. Equal fingerprints → `InSync`, whatever the timestamps say
//! 5. Strictly newer side wins; equal timestamps fall back to live
//!
//! Nothing is cached between calls. The filesystem can change between a
//! decision and the copy that acts on it; that race is accepted.

use std::fmt;
use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::copy::Excludes;
use crate::error::{io_err, SyncError};
use crate::fingerprint::{self, Fingerprint};

/// Directional outcome of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    InSync,
    CopyLiveToBackup,
    CopyBackupToLive,
}

impl SyncDecision {
    /// `(source, destination)` for a copying decision, `None` for `InSync`.
    pub fn direction<'a>(&self, live: &'a Path, backup: &'a Path) -> Option<(&'a Path, &'a Path)> {
        match self {
            SyncDecision::InSync => None,
            SyncDecision::CopyLiveToBackup => Some((live, backup)),
            SyncDecision::CopyBackupToLive => Some((backup, live)),
        }
    }
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDecision::InSync => write!(f, "in sync"),
            SyncDecision::CopyLiveToBackup => write!(f, "live -> backup"),
            SyncDecision::CopyBackupToLive => write!(f, "backup -> live"),
        }
    }
}

/// Content fingerprint and modification time of one side.
///
/// Only built for paths that exist. For a directory, `modified_at` is the
/// newest file mtime in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub path: PathBuf,
    pub modified_at: SystemTime,
    pub fingerprint: Fingerprint,
}

impl FileSnapshot {
    fn from_metadata(path: &Path, meta: &Metadata, excludes: &Excludes) -> Result<Self, SyncError> {
        let (fingerprint, modified_at) = if meta.is_dir() {
            fingerprint::hash_tree(path, excludes)?
        } else {
            let modified = meta.modified().map_err(|e| io_err(path, e))?;
            (fingerprint::hash_file(path)?, modified)
        };
        Ok(Self {
            path: path.to_path_buf(),
            modified_at,
            fingerprint,
        })
    }
}

/// Full result of inspecting a pair, including the conditions worth
/// surfacing to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub decision: SyncDecision,
    pub live_exists: bool,
    /// Contents differ but modification times are identical; live won by
    /// default and the choice may be wrong.
    pub timestamp_tie: bool,
}

impl Reconciliation {
    fn absent_side(decision: SyncDecision, live_exists: bool) -> Self {
        Self {
            decision,
            live_exists,
            timestamp_tie: false,
        }
    }
}

/// Decide which side of `live` / `backup` should overwrite the other.
///
/// Directory excludes use only the built-in version-control list.
pub fn reconcile(live: &Path, backup: &Path) -> Result<SyncDecision, SyncError> {
    Ok(inspect(live, backup, &Excludes::default())?.decision)
}

/// [`reconcile`] with configurable directory excludes and the full
/// [`Reconciliation`] detail.
pub fn inspect(live: &Path, backup: &Path, excludes: &Excludes) -> Result<Reconciliation, SyncError> {
    let live_meta = stat(live)?;
    let backup_meta = stat(backup)?;

    let (live_meta, backup_meta) = match (live_meta, backup_meta) {
        (None, None) => {
            tracing::debug!("neither {} nor {} exists", live.display(), backup.display());
            return Ok(Reconciliation::absent_side(SyncDecision::InSync, false));
        }
        (None, Some(_)) => {
            return Ok(Reconciliation::absent_side(SyncDecision::CopyBackupToLive, false))
        }
        (Some(_), None) => {
            return Ok(Reconciliation::absent_side(SyncDecision::CopyLiveToBackup, true))
        }
        (Some(l), Some(b)) => (l, b),
    };

    // Either tree may contain the other; neither walk descends into it.
    let excludes = excludes.clone().skipping([live, backup]);
    let live_snap = FileSnapshot::from_metadata(live, &live_meta, &excludes)?;
    let backup_snap = FileSnapshot::from_metadata(backup, &backup_meta, &excludes)?;
    let (decision, timestamp_tie) = decide(&live_snap, &backup_snap);

    if timestamp_tie {
        tracing::warn!(
            "{} and {} differ but share a modification time; keeping live copy",
            live.display(),
            backup.display()
        );
    } else {
        tracing::debug!(
            "{}: live={} backup={} -> {decision}",
            live.display(),
            live_snap.fingerprint,
            backup_snap.fingerprint
        );
    }

    Ok(Reconciliation {
        decision,
        live_exists: true,
        timestamp_tie,
    })
}

fn decide(live: &FileSnapshot, backup: &FileSnapshot) -> (SyncDecision, bool) {
    if live.fingerprint == backup.fingerprint {
        return (SyncDecision::InSync, false);
    }
    if backup.modified_at > live.modified_at {
        (SyncDecision::CopyBackupToLive, false)
    } else {
        let tie = backup.modified_at == live.modified_at;
        (SyncDecision::CopyLiveToBackup, tie)
    }
}

fn stat(path: &Path) -> Result<Option<Metadata>, SyncError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}
