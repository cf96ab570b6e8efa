//! Configuration loading
//!
//! Resolution order for every runtime knob:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (clap `env = ...` in each binary)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Airtable credentials are environment-only and are validated before any
//! network call is made.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "NOMEN_CONFIG";

pub const DEFAULT_AIRTABLE_API_ROOT: &str = "https://api.airtable.com/v0";
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Standard user-agent for all outbound HTTP (Wikidata requires a descriptive one)
pub fn get_user_agent() -> String {
    format!(
        "nomen/{} (name-profession pipeline; https://github.com/nomen-pipeline/nomen)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; missing keys take compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub wikidata: WikidataConfig,

    #[serde(default)]
    pub airtable: AirtableSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Scoring knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Minimum PMI score gap required before a prediction is written
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Wikidata SPARQL endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WikidataConfig {
    #[serde(default = "default_sparql_endpoint")]
    pub endpoint: String,

    /// Overrides [`get_user_agent`]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-profession result cap
    #[serde(default = "default_limit_per_profession")]
    pub limit_per_profession: u32,

    #[serde(default = "default_wikidata_rps")]
    pub requests_per_second: u32,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sparql_endpoint(),
            user_agent: None,
            limit_per_profession: default_limit_per_profession(),
            requests_per_second: default_wikidata_rps(),
        }
    }
}

/// Airtable transport settings (credentials come from the environment)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AirtableSettings {
    #[serde(default = "default_airtable_api_root")]
    pub api_root: String,

    /// Airtable allows 5 requests per second per base
    #[serde(default = "default_airtable_rps")]
    pub requests_per_second: u32,

    /// Pause after each successful single-record write
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            api_root: default_airtable_api_root(),
            requests_per_second: default_airtable_rps(),
            write_delay_ms: default_write_delay_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_threshold() -> f64 {
    0.8
}

fn default_sparql_endpoint() -> String {
    DEFAULT_SPARQL_ENDPOINT.to_string()
}

fn default_limit_per_profession() -> u32 {
    40
}

fn default_wikidata_rps() -> u32 {
    4
}

fn default_airtable_api_root() -> String {
    DEFAULT_AIRTABLE_API_ROOT.to_string()
}

fn default_airtable_rps() -> u32 {
    5
}

fn default_write_delay_ms() -> u64 {
    100
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicit path (CLI or `NOMEN_CONFIG`) must exist. The platform default
    /// path is optional: when absent, a warning is logged and compiled defaults
    /// are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Read config {} failed: {}", path.display(), e))
            })?;
            info!("Loaded config from {}", path.display());
            return Self::from_toml_str(&content);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                info!("Loaded config from {}", path.display());
                Self::from_toml_str(&content)
            }
            Some(path) => {
                warn!(
                    "Config file not found at {}, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config path: `<config_dir>/nomen/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nomen").join("config.toml"))
}

/// Airtable base/table coordinates and credentials
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub base_id: String,
    pub token: String,
    /// Table id (`tbl...`) or table name
    pub table: String,
    pub api_root: String,
}

impl AirtableConfig {
    /// Resolve credentials from `AIRTABLE_*` environment variables
    ///
    /// Token: `AIRTABLE_TOKEN`, else `AIRTABLE_API_KEY`.
    /// Table: `AIRTABLE_TABLE_ID`, else `AIRTABLE_TABLE_NAME`.
    pub fn from_env(api_root: &str) -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self::from_values(
            var("AIRTABLE_BASE_ID"),
            var("AIRTABLE_TOKEN").or_else(|| var("AIRTABLE_API_KEY")),
            var("AIRTABLE_TABLE_ID").or_else(|| var("AIRTABLE_TABLE_NAME")),
            api_root,
        )
    }

    pub fn from_values(
        base_id: Option<String>,
        token: Option<String>,
        table: Option<String>,
        api_root: &str,
    ) -> Result<Self> {
        let mut missing = Vec::new();
        if base_id.is_none() {
            missing.push("AIRTABLE_BASE_ID");
        }
        if token.is_none() {
            missing.push("AIRTABLE_TOKEN/AIRTABLE_API_KEY");
        }
        if table.is_none() {
            missing.push("AIRTABLE_TABLE_ID/AIRTABLE_TABLE_NAME");
        }

        match (base_id, token, table) {
            (Some(base_id), Some(token), Some(table)) => Ok(Self {
                base_id: base_id.trim().to_string(),
                token: sanitize_token(&token),
                table: table.trim().to_string(),
                api_root: api_root.trim_end_matches('/').to_string(),
            }),
            _ => Err(Error::Config(format!(
                "Missing Airtable environment: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Strip whitespace and embedded control characters copied along with tokens
pub fn sanitize_token(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect()
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
