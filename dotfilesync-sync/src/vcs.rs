//! Version-control capability for the backup tree.
//!
//! The engine never calls this; callers may publish the sync directory
//! after a successful run.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from a version-control step.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Add / commit / push for the backup tree.
pub trait VersionControl {
    fn add_all(&self) -> Result<(), VcsError>;
    fn commit(&self, message: &str) -> Result<(), VcsError>;
    fn push(&self) -> Result<(), VcsError>;
}

/// Stage everything, commit with `message`, and push, stopping at the first
/// failing step.
pub fn publish(vcs: &dyn VersionControl, message: &str) -> Result<(), VcsError> {
    vcs.add_all()?;
    vcs.commit(message)?;
    vcs.push()
}

/// [`VersionControl`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    program: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            program: PathBuf::from("git"),
        }
    }

    /// Use a different `git` binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn run(&self, args: &[&str]) -> Result<String, VcsError> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!("running `{command}` in {}", self.repo.display());
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(VcsError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControl for GitCli {
    fn add_all(&self) -> Result<(), VcsError> {
        self.run(&["add", "--all"]).map(drop)
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        let status = self.run(&["status", "--porcelain"])?;
        if status.trim().is_empty() {
            tracing::info!("nothing to commit in {}", self.repo.display());
            return Ok(());
        }
        self.run(&["commit", "--message", message]).map(drop)
    }

    fn push(&self) -> Result<(), VcsError> {
        self.run(&["push"]).map(drop)
    }
}
