//! # dotfilesync-sync
//!
//! Reconciliation and copy engine.
//!
//! Call [`reconcile`] to decide which side of a live/backup pair should win,
//! [`copy_file`] / [`copy_dir`] to carry the decision out, or
//! [`pipeline::run_at`] to process a whole manifest.

pub mod copy;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod reconcile;
pub mod vcs;

pub use copy::{copy_dir, copy_file, ensure_dir, ensure_dir_all, CopyStats, Excludes};
pub use error::SyncError;
pub use fingerprint::Fingerprint;
pub use pipeline::{EntryAction, EntryOutcome, SyncMode, SyncOptions, SyncReport};
pub use reconcile::{inspect, reconcile, FileSnapshot, Reconciliation, SyncDecision};
pub use vcs::{GitCli, VcsError, VersionControl};
