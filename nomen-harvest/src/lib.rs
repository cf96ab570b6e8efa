//! # nomen-harvest
//!
//! Wikidata-facing stages of the nomen pipeline:
//! - Harvest people by occupation and upsert them into Airtable
//! - Discover surname/occupation candidates into a CSV artifact
//! - Upload that CSV into the table
//! - Orchestrate discovery followed by upload

pub mod candidates;
pub mod dictionaries;
pub mod services;
pub mod wikidata;

pub use candidates::{CandidateRow, CandidateSheet};
pub use dictionaries::DiscoveryDictionaries;
pub use wikidata::{SparqlEndpoint, WikidataClient};
