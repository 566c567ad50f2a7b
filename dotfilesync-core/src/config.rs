//! YAML configuration manifest.
//!
//! # Location
//!
//! ```text
//! ~/.config/dotfilesync/config.yaml   (default)
//! <path>                              (--config <path>)
//! ```
//!
//! # API pattern
//!
//! Functions that depend on the home directory take it explicitly as
//! `fn_at(home: &Path, …)` so tests can point them at a `TempDir`; the
//! binary resolves the real one once with [`home`].

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::Config;

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.config/dotfilesync/config.yaml`: pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(".config").join("dotfilesync").join("config.yaml")
}

/// The user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and validate the config at `path`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML, and
/// `ConfigError::InvalidEntry` if a manifest path escapes the home directory.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(path, e)),
    };
    let config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load the config from `explicit` when given, otherwise from the default
/// location under `home`.
pub fn load_at(home: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => load_from(path),
        None => load_from(&default_config_path_at(home)),
    }
}

// ---------------------------------------------------------------------------
// 3. Validation
// ---------------------------------------------------------------------------

/// Reject manifest paths that are empty, absolute, or climb out of home.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    check_relative(&config.sync.sync_dir)?;
    if let Some(xdg) = &config.sync.xdg_dir {
        check_relative(xdg)?;
    }
    for path in config
        .dotfiles
        .dir_paths
        .iter()
        .chain(config.dotfiles.file_paths.iter())
    {
        check_relative(path)?;
    }
    for name in &config.dotfiles.ignore {
        if name.is_empty() || name.contains('/') {
            return Err(ConfigError::InvalidEntry {
                entry: name.clone(),
                reason: "ignore entries must be bare directory names",
            });
        }
    }
    Ok(())
}

fn check_relative(path: &Path) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidEntry {
        entry: path.display().to_string(),
        reason,
    };
    if path.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("path must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative to home"))
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
