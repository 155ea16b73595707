//! Ferment Ingest - local dry run of CSV normalization

use anyhow::{Context, Result};
use clap::Parser;
use ferment_common::{
    checksum::sha256_hex,
    logging::{init_logging, ConsoleStream, LogConfig, LogLevel},
    types::PumpLabels,
};
use ferment_ingest::{
    cli::{render_preview, Cli, Command},
    BatchNormalizer, IngestOptions,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Records go to stdout; logs stay on stderr and quiet unless asked for
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("ferment-ingest")
        .console_stream(ConsoleStream::Stderr)
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Preview(args) => {
            let content = tokio::fs::read(&args.file)
                .await
                .with_context(|| format!("Failed to read {}", args.file.display()))?;

            let options = IngestOptions::default()
                .with_labels(PumpLabels::new(args.pump1, args.pump2))
                .with_preamble_lines(args.preamble_lines);

            let batch = BatchNormalizer::new(options).normalize_bytes(&content);
            info!(
                file = %args.file.display(),
                accepted = batch.stats.accepted,
                rejected = batch.stats.rejected(),
                "Preview complete"
            );

            let checksum = sha256_hex(&content);
            println!("{}", render_preview(&batch, args.format, &checksum)?);
        },
    }

    Ok(())
}
