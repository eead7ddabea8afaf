//! Development tasks for the save system
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadSave};

/// Development tasks for the save system
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for save data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Clean save data and logs
    Clean(Clean),

    /// Decode and inspect the save slot
    ReadSave(ReadSave),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for SAVE_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Clean(cmd) => cmd.execute(),
        Command::ReadSave(cmd) => cmd.execute(),
    }
}
