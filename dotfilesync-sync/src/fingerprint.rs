//! Content fingerprints: 128-bit digests of file and directory contents.
//!
//! A fingerprint is the first 16 bytes of a streamed SHA-256 digest. It
//! detects content identity independent of metadata; it is not meant to
//! resist adversarial collisions.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::copy::Excludes;
use crate::error::{io_err, SyncError};

/// Length of a [`Fingerprint`] in bytes.
pub const FINGERPRINT_LEN: usize = 16;

/// Fixed-length content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    fn from_hasher(hasher: Sha256) -> Self {
        let digest = hasher.finalize();
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Fingerprint a single file by streaming its bytes through the digest.
pub fn hash_file(path: &Path) -> Result<Fingerprint, SyncError> {
    let mut hasher = Sha256::new();
    stream_into(path, &mut hasher)?;
    Ok(Fingerprint::from_hasher(hasher))
}

/// Fingerprint a directory tree.
///
/// Entries are visited in sorted name order; directories named in
/// `excludes` and any of its skipped paths are left out. Each relative path is fed to the digest along
/// with the file's bytes, so renames change the fingerprint.
///
/// Also returns the newest modification time of any regular file in the
/// tree, or the root's own mtime when the tree holds no files.
pub fn hash_tree(root: &Path, excludes: &Excludes) -> Result<(Fingerprint, SystemTime), SyncError> {
    let mut hasher = Sha256::new();
    let mut newest: Option<SystemTime> = None;
    walk(root, &PathBuf::new(), excludes, &mut hasher, &mut newest)?;

    let modified = match newest {
        Some(ts) => ts,
        None => fs::metadata(root)
            .and_then(|m| m.modified())
            .map_err(|e| io_err(root, e))?,
    };
    Ok((Fingerprint::from_hasher(hasher), modified))
}

fn walk(
    dir: &Path,
    rel: &Path,
    excludes: &Excludes,
    hasher: &mut Sha256,
    newest: &mut Option<SystemTime>,
) -> Result<(), SyncError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if excludes.is_skipped_path(&path) {
            continue;
        }
        let name = entry.file_name();
        let rel_path = rel.join(&name);
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;

        if file_type.is_dir() {
            if excludes.is_excluded(&name) {
                continue;
            }
            feed_header(hasher, b'D', &rel_path);
            walk(&path, &rel_path, excludes, hasher, newest)?;
        } else if file_type.is_file() {
            feed_header(hasher, b'F', &rel_path);
            let len = stream_into(&path, hasher)?;
            hasher.update(len.to_le_bytes());

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|e| io_err(&path, e))?;
            if newest.map_or(true, |n| modified > n) {
                *newest = Some(modified);
            }
        } else {
            // Symlinks and special files only contribute their name.
            feed_header(hasher, b'O', &rel_path);
        }
    }
    Ok(())
}

fn feed_header(hasher: &mut Sha256, tag: u8, rel: &Path) {
    hasher.update([tag]);
    hasher.update(rel.to_string_lossy().as_bytes());
    hasher.update([0u8]);
}

fn stream_into(path: &Path, hasher: &mut Sha256) -> Result<u64, SyncError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    io::copy(&mut file, hasher).map_err(|e| io_err(path, e))
}
