//! Copy primitives: directory scaffolding, single-file copy, recursive
//! directory copy.
//!
//! Writes land directly at the destination path; a copy interrupted midway
//! leaves a truncated destination behind. Open handles are owned by the
//! function that opened them and released on every return path.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Permission mode for every directory this crate creates (Unix only).
pub const DIR_MODE: u32 = 0o755;

/// Version-control metadata directories never copied into a mirror.
pub const VCS_METADATA_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr", "_darcs", "CVS"];

const COPY_BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Exclusions
// ---------------------------------------------------------------------------

/// Entries skipped by [`copy_dir`] and tree fingerprints.
///
/// Names always include [`VCS_METADATA_DIRS`]; configured names are added
/// on top. Skipped paths are exact locations, such as a sync root that
/// lives inside a tracked directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Excludes {
    extra: Vec<String>,
    paths: Vec<PathBuf>,
}

impl Excludes {
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: names.into_iter().map(Into::into).collect(),
            paths: Vec::new(),
        }
    }

    /// Also skip each of `paths` wherever a walk reaches it.
    pub fn skipping<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, name: &OsStr) -> bool {
        let Some(name) = name.to_str() else {
            return false;
        };
        VCS_METADATA_DIRS.contains(&name) || self.extra.iter().any(|e| e == name)
    }

    pub fn is_skipped_path(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

// ---------------------------------------------------------------------------
// Scaffolding
// ---------------------------------------------------------------------------

/// Create `path` (single level) with [`DIR_MODE`] unless something already
/// exists there.
///
/// An existing path is success even if it is not a directory; callers that
/// care must stat it themselves.
pub fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    ensure(path, false)
}

/// Like [`ensure_dir`], creating every missing ancestor too.
pub fn ensure_dir_all(path: &Path) -> Result<(), SyncError> {
    ensure(path, true)
}

fn ensure(path: &Path, recursive: bool) -> Result<(), SyncError> {
    match fs::metadata(path) {
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(path, e)),
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
        .create(path)
        .map_err(|source| SyncError::DirectoryCreate {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("created directory {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// copy_file
// ---------------------------------------------------------------------------

/// Copy the bytes of regular file `src` to `dst`, creating or truncating it.
///
/// Ownership, permission bits, and timestamps are not carried over.
/// Returns the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, SyncError> {
    let meta = match fs::symlink_metadata(src) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::PathNotFound {
                path: src.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(src, e)),
    };
    if !meta.file_type().is_file() {
        return Err(SyncError::NotRegularFile {
            path: src.to_path_buf(),
        });
    }

    let mut reader = File::open(src).map_err(|e| io_err(src, e))?;
    let mut writer = File::create(dst).map_err(|e| io_err(dst, e))?;

    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_err(src, e)),
        };
        writer.write_all(&buf[..n]).map_err(|e| io_err(dst, e))?;
        total += n as u64;
    }
    writer.flush().map_err(|e| io_err(dst, e))?;

    tracing::debug!("copied {} -> {} ({total} bytes)", src.display(), dst.display());
    Ok(total)
}

// ---------------------------------------------------------------------------
// copy_dir
// ---------------------------------------------------------------------------

/// Totals for a successful directory copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub bytes: u64,
    pub skipped_dirs: u64,
}

impl CopyStats {
    pub fn single_file(bytes: u64) -> Self {
        Self {
            files: 1,
            bytes,
            skipped_dirs: 0,
        }
    }
}

/// Recursively mirror `src` into `dst`.
///
/// Entries are processed in sorted name order. Excluded directories and
/// skipped paths are omitted entirely, and so is `dst` itself when it sits
/// inside `src`. The first failing entry aborts the copy and is returned;
/// entries already copied stay in place.
pub fn copy_dir(src: &Path, dst: &Path, excludes: &Excludes) -> Result<CopyStats, SyncError> {
    let meta = match fs::metadata(src) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::PathNotFound {
                path: src.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(src, e)),
    };
    if !meta.is_dir() {
        return Err(SyncError::NotADirectory {
            path: src.to_path_buf(),
        });
    }

    let excludes = excludes.clone().skipping([dst]);
    let mut stats = CopyStats::default();
    copy_tree(src, dst, &excludes, &mut stats)?;
    Ok(stats)
}

fn copy_tree(
    src: &Path,
    dst: &Path,
    excludes: &Excludes,
    stats: &mut CopyStats,
) -> Result<(), SyncError> {
    ensure_dir_all(dst)?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| io_err(src, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(src, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let from = entry.path();
        if excludes.is_skipped_path(&from) {
            tracing::debug!("skipping {}", from.display());
            continue;
        }
        let name = entry.file_name();
        let to = dst.join(&name);
        let file_type = entry.file_type().map_err(|e| io_err(&from, e))?;

        if file_type.is_dir() {
            if excludes.is_excluded(&name) {
                tracing::debug!("skipping excluded directory {}", from.display());
                stats.skipped_dirs += 1;
                continue;
            }
            copy_tree(&from, &to, excludes, stats)?;
        } else {
            stats.bytes += copy_file(&from, &to)?;
            stats.files += 1;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
