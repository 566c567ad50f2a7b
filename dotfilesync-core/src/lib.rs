//! dotfilesync core library: manifest types, configuration loading, path
//! resolution, errors.
//!
//! - [`types`]: manifest entries and the configuration schema
//! - [`error`]: [`ConfigError`]
//! - [`config`]: locate / load / validate the YAML manifest
//! - [`paths`]: join manifest entries onto the home and sync roots

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use error::ConfigError;
pub use paths::TrackedPath;
pub use types::{Config, DotfilesSection, EntryKind, ManifestEntry, SyncSection};
