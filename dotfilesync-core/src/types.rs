//! Domain types for the dotfilesync manifest.
//!
//! Manifest paths are kept as `PathBuf` relative to the user's home
//! directory. All schema types deserialize from YAML via serde + serde_yaml.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Manifest entries
// ---------------------------------------------------------------------------

/// Whether a tracked path is a single file or a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "dir"),
        }
    }
}

/// A single home-relative path tracked for syncing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl ManifestEntry {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

// ---------------------------------------------------------------------------
// Configuration schema
// ---------------------------------------------------------------------------

/// `sync:` section: where the backup tree lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    /// Root of the backup tree, relative to home.
    pub sync_dir: PathBuf,
    /// Optional XDG config mirror scaffolded under `sync_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xdg_dir: Option<PathBuf>,
}

/// `dotfiles:` section: what gets mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DotfilesSection {
    #[serde(default)]
    pub dir_paths: Vec<PathBuf>,
    #[serde(default)]
    pub file_paths: Vec<PathBuf>,
    /// Directory names skipped during directory copies, on top of the
    /// built-in version-control list.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Root of the YAML configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub sync: SyncSection,
    #[serde(default)]
    pub dotfiles: DotfilesSection,
}

impl Config {
    /// Every tracked entry: directories first, then files, each in
    /// manifest order.
    pub fn entries(&self) -> Vec<ManifestEntry> {
        let dirs = self
            .dotfiles
            .dir_paths
            .iter()
            .cloned()
            .map(ManifestEntry::directory);
        let files = self
            .dotfiles
            .file_paths
            .iter()
            .cloned()
            .map(ManifestEntry::file);
        dirs.chain(files).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_list_directories_before_files() {
        let config = Config {
            sync: SyncSection {
                sync_dir: PathBuf::from(".dotfilesync"),
                xdg_dir: None,
            },
            dotfiles: DotfilesSection {
                dir_paths: vec![PathBuf::from(".config/nvim")],
                file_paths: vec![PathBuf::from(".bashrc"), PathBuf::from(".zshrc")],
                ignore: vec![],
            },
        };
        let entries = config.entries();
        assert_eq!(
            entries,
            vec![
                ManifestEntry::directory(".config/nvim"),
                ManifestEntry::file(".bashrc"),
                ManifestEntry::file(".zshrc"),
            ]
        );
    }

    #[test]
    fn dotfiles_section_defaults_to_empty() {
        let yaml = "sync:\n  sync_dir: .dotfilesync\n";
        let config: Config = serde_yaml::from_str(yaml).expect("parse");
        assert!(config.entries().is_empty());
        assert!(config.dotfiles.ignore.is_empty());
        assert_eq!(config.sync.xdg_dir, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "sync:\n  sync_dir: .dotfilesync\n  sync_dri: typo\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn entry_display_is_relative_path() {
        assert_eq!(ManifestEntry::file(".bashrc").to_string(), ".bashrc");
        assert_eq!(EntryKind::Directory.to_string(), "dir");
    }
}
