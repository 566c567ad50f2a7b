//! Sync orchestration over a whole manifest.
//!
//! Entries are processed one at a time, in manifest order. A failing entry
//! is recorded and logged and the rest of the manifest still runs; inside a
//! single entry the copy is fail-fast.

use std::path::Path;

use chrono::{DateTime, Utc};

use dotfilesync_core::{paths, Config, EntryKind, TrackedPath};

use crate::copy::{copy_dir, copy_file, ensure_dir, ensure_dir_all, CopyStats, Excludes};
use crate::error::SyncError;
use crate::reconcile::{inspect, Reconciliation, SyncDecision};

/// Which directions a run may copy in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Follow the reconciler in both directions.
    #[default]
    Sync,
    /// Only ever write the backup tree.
    Backup,
}

/// Per-run settings, passed explicitly into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub mode: SyncMode,
    /// Report decisions without copying or scaffolding anything.
    pub dry_run: bool,
    pub excludes: Excludes,
}

impl SyncOptions {
    pub fn from_config(config: &Config, mode: SyncMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            excludes: Excludes::with_names(config.dotfiles.ignore.iter().cloned()),
        }
    }
}

/// What happened to one manifest entry.
#[derive(Debug)]
pub enum EntryAction {
    /// Both sides already match (or neither exists).
    Unchanged,
    Copied { stats: CopyStats },
    /// Dry run: the copy would have happened.
    WouldCopy,
    /// The mode forbids the copy the reconciler asked for.
    Skipped { reason: &'static str },
    Failed(SyncError),
}

/// Outcome of reconciling and copying one manifest entry.
#[derive(Debug)]
pub struct EntryOutcome {
    pub tracked: TrackedPath,
    /// `None` when reconciliation itself failed.
    pub decision: Option<SyncDecision>,
    pub timestamp_tie: bool,
    pub action: EntryAction,
}

impl EntryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.action, EntryAction::Failed(_))
    }
}

/// Summary of a pipeline run.
#[derive(Debug)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: SyncMode,
    pub dry_run: bool,
    pub outcomes: Vec<EntryOutcome>,
}

impl SyncReport {
    pub fn copied(&self) -> usize {
        self.count(|a| matches!(a, EntryAction::Copied { .. } | EntryAction::WouldCopy))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|a| matches!(a, EntryAction::Unchanged))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, EntryAction::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|a| matches!(a, EntryAction::Failed(_)))
    }

    /// Entries whose contents differed without a timestamp to settle it.
    pub fn drifted(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| o.timestamp_tie)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&EntryAction) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.action)).count()
    }
}

/// Scaffold the backup root, then reconcile and copy every manifest entry.
///
/// Only scaffolding failures abort the run; entry failures are recorded in
/// the report.
pub fn run_at(home: &Path, config: &Config, options: &SyncOptions) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();

    if !options.dry_run {
        scaffold_at(home, config)?;
    }

    // A sync root inside a tracked directory is never mirrored into itself.
    let options = SyncOptions {
        excludes: options
            .excludes
            .clone()
            .skipping([paths::sync_root_at(home, config)]),
        ..options.clone()
    };
    let outcomes = paths::resolve_at(home, config)
        .into_iter()
        .map(|tracked| process_entry(tracked, &options))
        .collect();

    Ok(SyncReport {
        started_at,
        finished_at: Utc::now(),
        mode: options.mode,
        dry_run: options.dry_run,
        outcomes,
    })
}

/// Create the sync root and the optional XDG mirror under it.
pub fn scaffold_at(home: &Path, config: &Config) -> Result<(), SyncError> {
    let root = paths::sync_root_at(home, config);
    ensure_dir_all(&root)?;
    if let Some(xdg) = paths::xdg_root_at(home, config) {
        ensure_dir(&xdg)?;
    }
    Ok(())
}

/// Carry out `decision` for `tracked`. `InSync` is a no-op returning `None`.
///
/// File entries get their destination's parent directory created first.
pub fn apply(
    decision: SyncDecision,
    tracked: &TrackedPath,
    excludes: &Excludes,
) -> Result<Option<CopyStats>, SyncError> {
    let Some((src, dst)) = decision.direction(&tracked.live, &tracked.backup) else {
        return Ok(None);
    };
    let stats = match tracked.kind() {
        EntryKind::File => {
            if let Some(parent) = dst.parent() {
                ensure_dir_all(parent)?;
            }
            CopyStats::single_file(copy_file(src, dst)?)
        }
        EntryKind::Directory => copy_dir(src, dst, excludes)?,
    };
    tracing::info!("copied {} -> {}", src.display(), dst.display());
    Ok(Some(stats))
}

fn process_entry(tracked: TrackedPath, options: &SyncOptions) -> EntryOutcome {
    let reconciliation = match inspect(&tracked.live, &tracked.backup, &options.excludes) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("{}: {e}", tracked.entry);
            return EntryOutcome {
                tracked,
                decision: None,
                timestamp_tie: false,
                action: EntryAction::Failed(e),
            };
        }
    };

    let decision = match constrain(options.mode, &reconciliation) {
        Ok(decision) => decision,
        Err(reason) => {
            tracing::warn!("{}: skipped, {reason}", tracked.entry);
            return EntryOutcome {
                tracked,
                decision: Some(reconciliation.decision),
                timestamp_tie: reconciliation.timestamp_tie,
                action: EntryAction::Skipped { reason },
            };
        }
    };

    let action = if decision == SyncDecision::InSync {
        tracing::debug!("{}: in sync", tracked.entry);
        EntryAction::Unchanged
    } else if options.dry_run {
        tracing::info!("[dry-run] {}: would copy {decision}", tracked.entry);
        EntryAction::WouldCopy
    } else {
        match apply(decision, &tracked, &options.excludes) {
            Ok(Some(stats)) => EntryAction::Copied { stats },
            Ok(None) => EntryAction::Unchanged,
            Err(e) => {
                tracing::warn!("{}: {e}", tracked.entry);
                EntryAction::Failed(e)
            }
        }
    };

    EntryOutcome {
        tracked,
        decision: Some(decision),
        timestamp_tie: reconciliation.timestamp_tie,
        action,
    }
}

/// Restrict the reconciler's decision to the directions `mode` allows.
fn constrain(mode: SyncMode, r: &Reconciliation) -> Result<SyncDecision, &'static str> {
    match (mode, r.decision) {
        (SyncMode::Backup, SyncDecision::CopyBackupToLive) if r.live_exists => {
            Ok(SyncDecision::CopyLiveToBackup)
        }
        (SyncMode::Backup, SyncDecision::CopyBackupToLive) => {
            Err("live copy is missing and backup mode never restores")
        }
        (_, decision) => Ok(decision),
    }
}
