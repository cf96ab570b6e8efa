//! Wikidata SPARQL client
//!
//! GET requests with `Accept: application/sparql-results+json`, throttled by a
//! rate limiter and retried under the shared [`RetryPolicy`].

use async_trait::async_trait;
use nomen_common::config::{get_user_agent, WikidataConfig};
use nomen_common::http::{build_client, rate_limiter, send_with_retry, DirectRateLimiter};
use nomen_common::{Error, Result, RetryPolicy};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// One bound variable in a result row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SparqlValue {
    pub value: String,
    /// Language tag of literal values
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

impl SparqlValue {
    pub fn literal(value: &str) -> Self {
        Self {
            value: value.to_string(),
            lang: None,
        }
    }
}

/// Variable name → value for one result row
pub type Binding = HashMap<String, SparqlValue>;

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<Binding>,
}

/// Trimmed value of `var`, empty when unbound
pub fn binding_text(binding: &Binding, var: &str) -> String {
    binding
        .get(var)
        .map(|v| v.value.trim().to_string())
        .unwrap_or_default()
}

/// Language tag of `var`, when it is a tagged literal
pub fn binding_lang(binding: &Binding, var: &str) -> Option<String> {
    binding
        .get(var)
        .and_then(|v| v.lang.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

/// Anything that answers SPARQL SELECT queries
#[async_trait]
pub trait SparqlEndpoint: Send + Sync {
    /// Run `query` and return its result rows
    async fn select(&self, operation: &str, query: &str) -> Result<Vec<Binding>>;
}

/// Wikidata Query Service client
pub struct WikidataClient {
    http: reqwest::Client,
    endpoint: Url,
    policy: RetryPolicy,
    limiter: DirectRateLimiter,
}

impl WikidataClient {
    pub fn new(config: &WikidataConfig, policy: RetryPolicy) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            Error::Config(format!("Invalid SPARQL endpoint {}: {}", config.endpoint, e))
        })?;
        let user_agent = config
            .user_agent
            .clone()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(get_user_agent);

        Ok(Self {
            http: build_client(&user_agent)?,
            endpoint,
            policy,
            limiter: rate_limiter(config.requests_per_second),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SparqlEndpoint for WikidataClient {
    async fn select(&self, operation: &str, query: &str) -> Result<Vec<Binding>> {
        let response = send_with_retry(&self.policy, &self.limiter, operation, || {
            self.http
                .get(self.endpoint.clone())
                .header(ACCEPT, SPARQL_RESULTS_JSON)
                .query(&[("query", query)])
        })
        .await?;

        let body: SparqlResponse = response.json().await?;
        tracing::debug!(operation, rows = body.results.bindings.len(), "SPARQL results");
        Ok(body.results.bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_results_parse_with_language_tags() {
        let body: SparqlResponse = serde_json::from_value(json!({
            "head": {"vars": ["person", "personLabel"]},
            "results": {"bindings": [{
                "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q937"},
                "personLabel": {"type": "literal", "value": " Albert Einstein ", "xml:lang": "en"}
            }]}
        }))
        .unwrap();

        let row = &body.results.bindings[0];
        assert_eq!(binding_text(row, "personLabel"), "Albert Einstein");
        assert_eq!(binding_lang(row, "personLabel"), Some("en".to_string()));
        assert_eq!(binding_lang(row, "person"), None);
        assert_eq!(binding_text(row, "surnameLabel"), "");
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let config = WikidataConfig {
            endpoint: "not a url".to_string(),
            ..WikidataConfig::default()
        };
        let err = WikidataClient::new(&config, RetryPolicy::none()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
