//! Read and inspect the save slot
//!
//! Decodes save.bin through the runtime codec and displays its contents,
//! together with the session metadata from the preference file.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use save_core::{FieldValue, SaveFile};
use save_runtime::codec;
use save_runtime::config::{PREFS_FILE_NAME, SAVE_FILE_NAME};
use save_runtime::{PreferenceStore, SessionMetadata};

use crate::dirs;

/// Read and inspect the save slot
#[derive(Parser)]
pub struct ReadSave {
    /// Read this file instead of the slot in the data directory
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Custom data directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Only show entities whose identity contains this text
    #[arg(short, long, value_name = "TEXT")]
    entity: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (entities, capability kinds, fields)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadSave {
    pub fn execute(self) -> Result<()> {
        let data_dir = dirs::data_dir(self.data_dir);
        let save_path = self.file.unwrap_or_else(|| data_dir.join(SAVE_FILE_NAME));

        if !save_path.exists() {
            println!(
                "{} No save at {}",
                style("∅").dim(),
                save_path.display()
            );
            return Ok(());
        }

        let bytes = std::fs::read(&save_path)
            .with_context(|| format!("Failed to read save file: {}", save_path.display()))?;

        println!("{} {}", style("Save File:").bold().cyan(), save_path.display());
        println!("{} {}", style("File Size:").bold().cyan(), format_bytes(bytes.len()));
        if let Some(digest) = codec::payload_digest(&bytes) {
            println!("{} {}", style("Digest:").bold().cyan(), digest);
        }

        let prefs = PreferenceStore::open(data_dir.join(PREFS_FILE_NAME))?;
        let session = SessionMetadata::load(&prefs);
        println!(
            "{} {} ({})",
            style("Saved Level:").bold().cyan(),
            session.saved_level.as_deref().unwrap_or("-"),
            if session.resume_in_place {
                "checkpoint"
            } else {
                "transition"
            }
        );
        println!();

        let mut file = match codec::decode(&bytes) {
            Ok(file) => file,
            Err(e) => {
                println!("{} {}", style("✗ Corrupt save:").red().bold(), e);
                anyhow::bail!("Save file failed to decode");
            }
        };

        if let Some(filter) = &self.entity {
            file = file
                .iter()
                .filter(|(identity, _)| identity.as_str().contains(filter.as_str()))
                .map(|(identity, bundle)| (identity.clone(), bundle.clone()))
                .collect();
        }

        match self.format {
            OutputFormat::Summary => print_summary(&file),
            OutputFormat::Json => print_json(&file)?,
            OutputFormat::Debug => println!("{:#?}", file),
        }

        Ok(())
    }
}

fn print_summary(file: &SaveFile) {
    println!("{}", style("=== Save Summary ===").bold().green());
    println!("  Entities: {}", file.len());
    println!();

    for (identity, bundle) in file.iter() {
        println!("{}", style(identity).bold().yellow());
        for (kind, capsule) in bundle.iter() {
            let fields: Vec<String> = capsule
                .fields()
                .map(|(name, value)| format!("{name}={}", format_value(value)))
                .collect();
            println!("  {}: {}", style(kind).cyan(), fields.join(", "));
        }
    }
}

fn print_json(file: &SaveFile) -> Result<()> {
    let json = serde_json::to_string_pretty(file).context("Failed to serialize save to JSON")?;
    println!("{}", json);
    Ok(())
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(v) => v.to_string(),
        FieldValue::Int(v) => v.to_string(),
        FieldValue::Float(v) => format!("{v:.3}"),
        FieldValue::Text(v) => format!("{v:?}"),
        FieldValue::List(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        FieldValue::Record(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name}: {}", format_value(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
