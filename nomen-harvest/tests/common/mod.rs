//! Scripted SPARQL endpoint shared by the harvest tests

#![allow(dead_code)]

use async_trait::async_trait;
use nomen_common::{Error, Result};
use nomen_harvest::wikidata::{Binding, SparqlEndpoint, SparqlValue};
use std::sync::Mutex;

pub const ENTITY: &str = "http://www.wikidata.org/entity/";

enum Outcome {
    Rows(Vec<Binding>),
    Status(u16),
    Config,
}

/// Answers each query with the first route whose needle it contains
#[derive(Default)]
pub struct ScriptedEndpoint {
    routes: Vec<(String, Outcome)>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, rows: Vec<Binding>) -> Self {
        self.routes.push((needle.to_string(), Outcome::Rows(rows)));
        self
    }

    pub fn failing(mut self, needle: &str, status: u16) -> Self {
        self.routes.push((needle.to_string(), Outcome::Status(status)));
        self
    }

    pub fn misconfigured(mut self, needle: &str) -> Self {
        self.routes.push((needle.to_string(), Outcome::Config));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SparqlEndpoint for ScriptedEndpoint {
    async fn select(&self, operation: &str, query: &str) -> Result<Vec<Binding>> {
        self.queries.lock().unwrap().push(query.to_string());

        let outcome = self
            .routes
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, outcome)| outcome);
        match outcome {
            Some(Outcome::Rows(rows)) => Ok(rows.clone()),
            Some(Outcome::Status(status)) => Err(Error::Http {
                operation: operation.to_string(),
                status: *status,
                body: "scripted failure".to_string(),
            }),
            Some(Outcome::Config) => Err(Error::Config("scripted misconfiguration".to_string())),
            None => Ok(Vec::new()),
        }
    }
}

/// Result row of plain literals
pub fn row(pairs: &[(&str, &str)]) -> Binding {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), SparqlValue::literal(v)))
        .collect()
}

/// Result row whose `personLabel` carries a language tag
pub fn tagged_row(pairs: &[(&str, &str)], lang: &str) -> Binding {
    let mut binding = row(pairs);
    if let Some(label) = binding.get_mut("personLabel") {
        label.lang = Some(lang.to_string());
    }
    binding
}

pub fn entity(qid: &str) -> String {
    format!("{}{}", ENTITY, qid)
}
