//! Wikidata SPARQL access
//!
//! - [`query`]: query text builders (occupation lookup, people by occupation,
//!   surname-pattern discovery)
//! - [`client`]: the [`SparqlEndpoint`] seam and its HTTP implementation

pub mod client;
pub mod query;

pub use client::{binding_lang, binding_text, Binding, SparqlEndpoint, SparqlValue, WikidataClient};
pub use query::{DiscoveryMode, QueryTemplate};
