//! Error types for dotfilesync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating, reading, or validating the
/// configuration manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure other than absence (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file did not exist at the expected path.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A manifest entry (or `sync_dir`) is not a usable home-relative path.
    #[error("invalid manifest entry '{entry}': {reason}")]
    InvalidEntry { entry: String, reason: &'static str },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
