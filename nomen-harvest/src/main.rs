//! nomen-harvest - Wikidata stages of the nomen pipeline
//!
//! Subcommands:
//! - `harvest`: people by occupation → Airtable upsert
//! - `discover`: surname-pattern candidates → CSV
//! - `upload`: candidates CSV → Airtable upsert
//! - `orchestrate`: discover, then upload

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Args as ClapArgs, Parser, Subcommand};
use nomen_common::airtable::{AirtableClient, RecordStore};
use nomen_common::config::{split_list, AirtableConfig, TomlConfig};
use nomen_common::{logging, RetryPolicy};
use nomen_harvest::dictionaries::{parse_cluster_list, DiscoveryDictionaries};
use nomen_harvest::services::{
    run_discovery, run_harvest, run_orchestration, run_upload, DiscoveryOptions, HarvestOptions,
    OrchestrateOptions, UploadOptions,
};
use nomen_harvest::wikidata::{DiscoveryMode, QueryTemplate};
use nomen_harvest::WikidataClient;
use tracing::{info, warn};

/// Command-line arguments for nomen-harvest
#[derive(Parser, Debug)]
#[command(name = "nomen-harvest")]
#[command(about = "Wikidata harvest, discovery and upload into an Airtable table")]
#[command(version)]
struct Args {
    /// TOML config file (default: $NOMEN_CONFIG, then <config_dir>/nomen/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Compute and count without writing to Airtable
    #[arg(long, global = true, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch people by occupation and upsert them
    Harvest {
        /// Comma list of English occupation labels (default: built-in list)
        #[arg(long, env = "WIKIDATA_PROF_LIST")]
        labels: Option<String>,

        /// Per-profession result cap (default from config, 40)
        #[arg(long, env = "WIKIDATA_LIMIT_PER_PROF")]
        limit: Option<u32>,

        /// Also match subclasses of each occupation
        #[arg(long)]
        transitive: bool,
    },
    /// Write surname-pattern candidates to a CSV
    Discover(DiscoverArgs),
    /// Upsert a candidates CSV into the table
    Upload {
        #[arg(long, default_value = "data/candidates_raw.csv")]
        csv: PathBuf,

        /// Value written to language-like columns
        #[arg(long)]
        lang: Option<String>,
    },
    /// Discover, then upload the resulting CSV
    Orchestrate {
        #[command(flatten)]
        discover: DiscoverArgs,

        /// Stop after discovery
        #[arg(long)]
        skip_upload: bool,

        /// Value written to language-like columns
        #[arg(long)]
        lang: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct DiscoverArgs {
    /// Comma/space separated cluster names
    #[arg(long, default_value = "Trades")]
    clusters: String,

    /// Per-occupation result cap
    #[arg(long, default_value_t = 40)]
    limit: u32,

    /// Comma list of label languages
    #[arg(long, default_value = "en")]
    langs: String,

    /// open (surname filter only) or strict (occupation label must match too)
    #[arg(long, default_value_t = DiscoveryMode::Open)]
    mode: DiscoveryMode,

    /// Drop candidates whose surname match score is lower
    #[arg(long, default_value_t = 0.0)]
    min_match: f64,

    #[arg(long, default_value = "data/candidates_raw.csv")]
    outfile: PathBuf,

    /// Discovery query template file
    #[arg(long)]
    template: Option<PathBuf>,

    /// cluster → occupations JSON file
    #[arg(long)]
    occupations_json: Option<PathBuf>,

    /// occupation → surname prefixes JSON file
    #[arg(long)]
    prefixes_json: Option<PathBuf>,
}

impl DiscoverArgs {
    fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            clusters: parse_cluster_list(&self.clusters),
            limit: self.limit,
            langs: self.langs.clone(),
            mode: self.mode,
            min_match: self.min_match,
            outfile: self.outfile.clone(),
        }
    }

    fn dictionaries(&self) -> Result<DiscoveryDictionaries> {
        DiscoveryDictionaries::load(self.occupations_json.as_deref(), self.prefixes_json.as_deref())
            .context("Failed to load discovery dictionaries")
    }

    fn template(&self) -> Result<QueryTemplate> {
        match &self.template {
            Some(path) => QueryTemplate::from_file(path).context("Failed to load query template"),
            None => Ok(QueryTemplate::builtin()),
        }
    }
}

fn airtable_store(config: &TomlConfig) -> Result<AirtableClient> {
    let credentials = AirtableConfig::from_env(&config.airtable.api_root)
        .context("Airtable credentials are required")?;
    info!(base = %credentials.base_id, table = %credentials.table, "Airtable target");
    AirtableClient::new(credentials, &config.airtable, RetryPolicy::default())
        .context("Failed to build Airtable client")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    logging::init(&config.logging).context("Failed to initialize logging")?;

    info!("Starting nomen-harvest v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Harvest {
            labels,
            limit,
            transitive,
        } => {
            let store = airtable_store(&config)?;
            let wikidata = WikidataClient::new(&config.wikidata, RetryPolicy::default())
                .context("Failed to build Wikidata client")?;

            let mut options = HarvestOptions {
                limit_per_profession: limit.unwrap_or(config.wikidata.limit_per_profession),
                transitive,
                dry_run: args.dry_run,
                write_delay: Duration::from_millis(config.airtable.write_delay_ms),
                ..HarvestOptions::default()
            };
            if let Some(labels) = labels.as_deref().map(split_list).filter(|l| !l.is_empty()) {
                options.labels = labels;
            }

            let summary = run_harvest(&wikidata, &store, &options).await?;
            println!("[harvest] {}", summary);
        }
        Command::Discover(discover) => {
            let dicts = discover.dictionaries()?;
            let template = discover.template()?;
            let wikidata = WikidataClient::new(&config.wikidata, RetryPolicy::default())
                .context("Failed to build Wikidata client")?;

            let options = discover.options();
            let written = run_discovery(&wikidata, &dicts, &template, &options).await?;
            println!("[discover] wrote {} rows to {}", written, options.outfile.display());
        }
        Command::Upload { csv, lang } => {
            let store = airtable_store(&config)?;
            let options = UploadOptions {
                csv,
                lang,
                dry_run: args.dry_run,
            };
            let summary = run_upload(&store, &options).await?;
            println!("[upload] {}", summary);
        }
        Command::Orchestrate {
            discover,
            skip_upload,
            lang,
        } => {
            let dicts = discover.dictionaries()?;
            let template = discover.template()?;
            let wikidata = WikidataClient::new(&config.wikidata, RetryPolicy::default())
                .context("Failed to build Wikidata client")?;

            let store = if skip_upload {
                None
            } else {
                match airtable_store(&config) {
                    Ok(store) => Some(store),
                    Err(e) => {
                        warn!(error = %format!("{:#}", e), "No Airtable store");
                        None
                    }
                }
            };

            let options = OrchestrateOptions {
                discovery: discover.options(),
                skip_upload,
                lang,
                dry_run: args.dry_run,
            };
            let report = run_orchestration(
                &wikidata,
                &dicts,
                &template,
                store.as_ref().map(|s| s as &dyn RecordStore),
                &options,
            )
            .await?;

            println!("[discover] {} candidates", report.candidates);
            match report.upload {
                Some(summary) => println!("[upload] {}", summary),
                None => println!("[upload] skipped"),
            }
        }
    }

    Ok(())
}
