//! Error types for dotfilesync-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from reconciliation and copy operations.
///
/// Every filesystem variant names the path it failed on.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A path that must exist (a copy source) was absent.
    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// A copy source is a directory, symlink, or special file.
    #[error("not a regular file: {path}")]
    NotRegularFile { path: PathBuf },

    /// A directory copy source is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Open / read / write / stat failed for a reason other than absence.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scaffolding a destination directory failed.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// The path this error is about.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            SyncError::PathNotFound { path }
            | SyncError::NotRegularFile { path }
            | SyncError::NotADirectory { path }
            | SyncError::Io { path, .. }
            | SyncError::DirectoryCreate { path, .. } => Some(path),
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
