//! dotfilesync: keep dotfiles and their backup tree in step.
//!
//! # Usage
//!
//! ```text
//! dotfilesync [--config <path>] --sync   [--push] [--dry-run] [--verbose]
//! dotfilesync [--config <path>] --backup [--push] [--dry-run] [--verbose]
//! dotfilesync [--config <path>] --push
//! dotfilesync version
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::run::RunArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dotfilesync",
    version,
    about = "A command-line dotfile syncing tool",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    /// Log every decision and copy (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the version number of dotfilesync.
    Version,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Some(Commands::Version) => commands::version::run(),
        None => cli.run.run(),
    }
}
