//! `dotfilesync version`

use anyhow::Result;

pub fn run() -> Result<()> {
    println!("dotfilesync v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
