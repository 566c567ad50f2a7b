//! Live-path / backup-path resolution.
//!
//! Pure path construction, no I/O. Every manifest entry maps to
//! `<home>/<entry>` (live) and `<home>/<sync_dir>/<entry>` (backup).

use std::path::{Path, PathBuf};

use crate::types::{Config, EntryKind, ManifestEntry};

/// A manifest entry resolved to absolute paths on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPath {
    pub entry: ManifestEntry,
    pub live: PathBuf,
    pub backup: PathBuf,
}

impl TrackedPath {
    pub fn kind(&self) -> EntryKind {
        self.entry.kind
    }
}

/// `<home>/<sync_dir>`
pub fn sync_root_at(home: &Path, config: &Config) -> PathBuf {
    home.join(&config.sync.sync_dir)
}

/// `<home>/<sync_dir>/<xdg_dir>` when an XDG mirror is configured.
pub fn xdg_root_at(home: &Path, config: &Config) -> Option<PathBuf> {
    config
        .sync
        .xdg_dir
        .as_ref()
        .map(|xdg| sync_root_at(home, config).join(xdg))
}

/// Resolve a single entry against `home` and the backup root.
pub fn resolve_entry(home: &Path, sync_root: &Path, entry: ManifestEntry) -> TrackedPath {
    TrackedPath {
        live: home.join(&entry.path),
        backup: sync_root.join(&entry.path),
        entry,
    }
}

/// Resolve every manifest entry: directories first, then files.
pub fn resolve_at(home: &Path, config: &Config) -> Vec<TrackedPath> {
    let sync_root = sync_root_at(home, config);
    config
        .entries()
        .into_iter()
        .map(|entry| resolve_entry(home, &sync_root, entry))
        .collect()
}
