//! # nomen Common Library
//!
//! Shared code for the nomen pipeline stages including:
//! - Error taxonomy (configuration, transient network, data, validation)
//! - Configuration loading (environment, TOML, compiled defaults)
//! - Logging setup
//! - Bounded retry policy for every HTTP call site
//! - Airtable record store (REST client, schema mapping, in-memory store)
//! - Run summaries

pub mod airtable;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod retry;
pub mod summary;

pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use summary::RunSummary;
