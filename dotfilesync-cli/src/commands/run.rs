//! `dotfilesync --sync | --backup [--push]`: reconcile the manifest and
//! optionally publish the backup tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use dotfilesync_core::{config, paths, Config};
use dotfilesync_sync::{
    pipeline::{self, EntryAction, EntryOutcome, SyncMode, SyncOptions, SyncReport},
    vcs::{self, GitCli},
    SyncDecision,
};

/// Action flags and run settings.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (default is $HOME/.config/dotfilesync/config.yaml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sync dotfiles and the sync directory in whichever direction is newer.
    #[arg(long, short = 's')]
    pub sync: bool,

    /// Copy dotfiles into the sync directory only; never overwrite live files.
    #[arg(long, short = 'b', conflicts_with = "sync")]
    pub backup: bool,

    /// Commit and push the sync directory with git afterwards.
    #[arg(long, short = 'p')]
    pub push: bool,

    /// Show what would be copied without touching any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    fn mode(&self) -> Option<SyncMode> {
        if self.sync {
            Some(SyncMode::Sync)
        } else if self.backup {
            Some(SyncMode::Backup)
        } else {
            None
        }
    }

    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let cfg = config::load_at(&home, self.config.as_deref())
            .context("failed to load dotfilesync config")?;

        let mut failed = 0;
        match self.mode() {
            Some(mode) => {
                let options = SyncOptions::from_config(&cfg, mode, self.dry_run);
                let report = pipeline::run_at(&home, &cfg, &options).context("sync failed")?;
                print_report(&report);
                failed = report.failed();
            }
            None => {
                if !self.dry_run {
                    pipeline::scaffold_at(&home, &cfg).context("failed to scaffold sync directory")?;
                }
                if !self.push {
                    println!(
                        "Sync directory ready at {}. Pass --sync, --backup or --push to do more.",
                        paths::sync_root_at(&home, &cfg).display()
                    );
                }
            }
        }

        if failed > 0 {
            bail!("{failed} entr{} failed to sync", if failed == 1 { "y" } else { "ies" });
        }

        if self.push {
            push(&home, &cfg, self.dry_run)?;
        }
        Ok(())
    }
}

fn push(home: &Path, cfg: &Config, dry_run: bool) -> Result<()> {
    let root = paths::sync_root_at(home, cfg);
    if dry_run {
        println!("[dry-run] would commit and push {}", root.display());
        return Ok(());
    }
    let git = GitCli::new(&root);
    let message = format!("dotfilesync: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    vcs::publish(&git, &message)
        .with_context(|| format!("failed to push {}", root.display()))?;
    println!("{} pushed {}", "✓".green(), git.repo().display());
    Ok(())
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    for outcome in &report.outcomes {
        println!("{prefix}{}", describe(outcome));
        if outcome.timestamp_tie {
            println!(
                "  {} {} differs from its backup with identical timestamps; kept the live copy",
                "!".yellow(),
                outcome.tracked.entry
            );
        }
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "{prefix}{} copied, {} unchanged, {} skipped, {} failed ({} ms)",
        report.copied(),
        report.unchanged(),
        report.skipped(),
        report.failed(),
        elapsed.num_milliseconds()
    );
}

fn describe(outcome: &EntryOutcome) -> String {
    let entry = &outcome.tracked.entry;
    match &outcome.action {
        EntryAction::Unchanged => format!("  {}  {entry} in sync", "↔".dimmed()),
        EntryAction::Copied { stats } => format!(
            "  {}  {entry} ({} file(s), {} bytes)",
            arrow(outcome.decision).green(),
            stats.files,
            stats.bytes
        ),
        EntryAction::WouldCopy => {
            format!("  ~  {entry} would copy {}", arrow(outcome.decision))
        }
        EntryAction::Skipped { reason } => {
            format!("  {}  {entry} skipped: {reason}", "·".yellow())
        }
        EntryAction::Failed(err) => format!("  {}  {entry} failed: {err}", "✗".red()),
    }
}

fn arrow(decision: Option<SyncDecision>) -> &'static str {
    match decision {
        Some(SyncDecision::CopyLiveToBackup) => "live → backup",
        Some(SyncDecision::CopyBackupToLive) => "backup → live",
        Some(SyncDecision::InSync) | None => "",
    }
}
