//! Command-line definitions for `ferment-ingest`
//!
//! Kept in the library so `xtask` can render the reference docs from the same
//! clap definitions the binary parses.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferment_common::types::{DEFAULT_PUMP1_LABEL, DEFAULT_PUMP2_LABEL};
use serde_json::json;

use crate::models::NormalizedBatch;
use crate::options::DEFAULT_PREAMBLE_LINES;

#[derive(Parser, Debug)]
#[command(name = "ferment-ingest")]
#[command(author, version, about = "Normalize fermentation CSV exports without touching the database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (log every discarded line)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize a CSV file and print what an upload would store
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// CSV export to normalize
    pub file: PathBuf,

    /// Substance assigned to pump 1
    #[arg(long, default_value = DEFAULT_PUMP1_LABEL)]
    pub pump1: String,

    /// Substance assigned to pump 2
    #[arg(long, default_value = DEFAULT_PUMP2_LABEL)]
    pub pump2: String,

    /// Leading lines to skip before data rows
    #[arg(long, default_value_t = DEFAULT_PREAMBLE_LINES)]
    pub preamble_lines: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per record
    Json,
    /// Line counts and document checksum
    Summary,
}

/// Render a normalized batch for the terminal
pub fn render_preview(
    batch: &NormalizedBatch,
    format: OutputFormat,
    checksum: &str,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let lines = batch
                .records
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        },
        OutputFormat::Summary => Ok(serde_json::to_string_pretty(&json!({
            "checksum": checksum,
            "records": batch.len(),
            "stats": batch.stats,
        }))?),
    }
}
