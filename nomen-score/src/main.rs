//! nomen-score - scoring passes over the Airtable table
//!
//! Subcommands:
//! - `analyze`: PMI name → label prediction (threshold and lock aware)
//! - `enrich`: etymology roots, gloss and origin
//! - `align`: etymology ↔ profession keyword alignment

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use nomen_common::airtable::AirtableClient;
use nomen_common::config::{AirtableConfig, TomlConfig};
use nomen_common::{logging, RetryPolicy};
use nomen_score::services::{
    run_align, run_analyze, run_enrich, AlignOptions, AnalyzeOptions, EnrichOptions, LabelSource,
};
use nomen_score::{Lexicon, ProfessionKeywords};
use tracing::info;

/// Command-line arguments for nomen-score
#[derive(Parser, Debug)]
#[command(name = "nomen-score")]
#[command(about = "Name/profession scoring passes over an Airtable table")]
#[command(version)]
struct Args {
    /// TOML config file (default: $NOMEN_CONFIG, then <config_dir>/nomen/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Compute and count without writing
    #[arg(long, global = true, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Learn token/label PMI from labeled rows and write confident predictions
    Analyze {
        /// Minimum score gap to write (default from config, 0.8)
        #[arg(long, env = "THRESHOLD")]
        threshold: Option<f64>,

        /// Training label column: cluster or profession
        #[arg(long, default_value_t = LabelSource::Cluster)]
        label: LabelSource,
    },
    /// Derive name roots, gloss and origin
    Enrich,
    /// Score name roots against profession keywords
    Align,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    logging::init(&config.logging).context("Failed to initialize logging")?;

    info!("Starting nomen-score v{}", env!("CARGO_PKG_VERSION"));

    let credentials = AirtableConfig::from_env(&config.airtable.api_root)
        .context("Airtable credentials are required")?;
    info!(base = %credentials.base_id, table = %credentials.table, "Airtable target");
    let store = AirtableClient::new(credentials, &config.airtable, RetryPolicy::default())
        .context("Failed to build Airtable client")?;

    let write_delay = Duration::from_millis(config.airtable.write_delay_ms);

    let (stage, summary) = match args.command {
        Command::Analyze { threshold, label } => {
            let options = AnalyzeOptions {
                threshold: threshold.unwrap_or(config.scoring.threshold),
                dry_run: args.dry_run,
                label,
                write_delay,
            };
            ("analyze", run_analyze(&store, &options).await?)
        }
        Command::Enrich => {
            let options = EnrichOptions {
                dry_run: args.dry_run,
                write_delay,
            };
            let lexicon = Lexicon::builtin();
            ("enrich", run_enrich(&store, &lexicon, &options).await?)
        }
        Command::Align => {
            let options = AlignOptions {
                dry_run: args.dry_run,
                write_delay,
            };
            let keywords = ProfessionKeywords::builtin();
            ("align", run_align(&store, &keywords, &options).await?)
        }
    };

    println!("[{}] {}", stage, summary);
    Ok(())
}
