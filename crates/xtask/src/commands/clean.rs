//! Clean save data and logs command
//!
//! - Logs: `{data_dir}/logs`, one directory per run
//! - Save data: the save slot, its temp file and the preference file
//!
//! Safety: Always prompts for confirmation before deletion.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use save_runtime::config::{PREFS_FILE_NAME, SAVE_FILE_NAME};
use save_runtime::{FileSaveRepository, SaveRepository};

use crate::dirs;

/// Clean save data and logs
#[derive(Parser, Debug)]
pub struct Clean {
    /// Clean only logs
    #[arg(long)]
    pub logs: bool,

    /// Clean only save data (slot and preferences)
    #[arg(long)]
    pub data: bool,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Specific session to clean (only works with --logs)
    #[arg(long)]
    pub session: Option<String>,

    /// Custom data directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

enum Target {
    Dir(PathBuf),
    SaveData(PathBuf),
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        // If no flags specified, clean both
        let clean_logs = self.logs || !self.data;
        let clean_data = self.data || !self.logs;

        if self.session.is_some() && !self.logs {
            anyhow::bail!("--session can only be used with --logs");
        }

        let data_dir = dirs::data_dir(self.data_dir.clone());
        let mut targets: Vec<(String, Target)> = Vec::new();

        if clean_logs {
            let log_dir = dirs::log_dir(&data_dir);
            if let Some(ref session_id) = self.session {
                let session_dir = log_dir.join(session_id);
                if !session_dir.exists() {
                    eprintln!(
                        "{} Session not found: {}",
                        style("✗").red().bold(),
                        style(session_id).cyan()
                    );
                    anyhow::bail!("Session directory does not exist");
                }
                targets.push((format!("Session logs ({})", session_id), Target::Dir(session_dir)));
            } else if log_dir.exists() {
                let count = dirs::list_sessions(&log_dir)?.len();
                targets.push((format!("All logs ({count} sessions)"), Target::Dir(log_dir)));
            }
        }

        if clean_data
            && (data_dir.join(SAVE_FILE_NAME).exists() || data_dir.join(PREFS_FILE_NAME).exists())
        {
            targets.push(("Save slot and preferences".to_string(), Target::SaveData(data_dir)));
        }

        if targets.is_empty() {
            println!("{}", style("Nothing to clean").dim());
            return Ok(());
        }

        println!("{}", style("Clean save data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for (label, target) in &targets {
            let path = match target {
                Target::Dir(path) | Target::SaveData(path) => path,
            };
            println!("  {} {}", style("→").cyan(), style(label).bold());
            println!("    {}", style(path.display()).dim());
        }
        println!();

        if !self.yes && !self.confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for (label, target) in targets {
            print!("Deleting {}... ", label);
            io::stdout().flush()?;

            match target {
                Target::Dir(path) => std::fs::remove_dir_all(&path)
                    .with_context(|| format!("Failed to delete: {}", path.display()))?,
                Target::SaveData(dir) => delete_save_data(dir)?,
            }

            println!("{}", style("✓").green());
        }

        println!();
        println!("{}", style("✓ Cleanup complete!").green().bold());

        Ok(())
    }

    /// Prompt user for confirmation
    fn confirm(&self) -> Result<bool> {
        print!("{} ", style("Proceed? [y/N]").yellow().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }
}

fn delete_save_data(dir: PathBuf) -> Result<()> {
    FileSaveRepository::new(&dir, SAVE_FILE_NAME)?
        .delete()
        .context("Failed to delete save slot")?;

    let prefs = dir.join(PREFS_FILE_NAME);
    if prefs.exists() {
        std::fs::remove_file(&prefs)
            .with_context(|| format!("Failed to delete: {}", prefs.display()))?;
    }
    Ok(())
}
