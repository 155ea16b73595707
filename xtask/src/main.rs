//! Build automation tasks for Ferment
//!
//! - Generating the `ferment-ingest` CLI reference from its clap definitions

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for Ferment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the ferment-ingest CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<ferment_ingest::cli::Cli>();

    let content = format!(
        r#"# ferment-ingest CLI Reference

Generated from the CLI source code. Last updated: {}.

`ferment-ingest` runs the same normalization the server applies to uploads,
locally and without a database. Use it to check what a controller export
will turn into before uploading it.

## Installation

```bash
cargo install --path crates/ferment-ingest
```

## Quick Start

```bash
# Records as JSON lines, pump channels labelled Glucose / Base
ferment-ingest preview run.csv

# Different substances, counts only
ferment-ingest preview run.csv --pump1 Glycerol --pump2 Acid --format summary

# Log every discarded line
ferment-ingest preview run.csv -v
```

## Commands

{}

## Environment Variables

- `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT`, `LOG_DIR`, `LOG_FILTER` - logging overrides
- `RUST_LOG` - additional `tracing` filter directives

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
