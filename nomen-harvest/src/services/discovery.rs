//! Surname-pattern discovery
//!
//! For every occupation of the requested clusters, query people whose surname
//! starts with one of the occupation's surname prefixes (optionally requiring
//! the occupation label to match), score each hit, and write the survivors to
//! the candidates CSV.

use crate::candidates::{write_candidates, CandidateRow};
use crate::dictionaries::DiscoveryDictionaries;
use crate::wikidata::query::surname_pattern;
use crate::wikidata::{binding_text, DiscoveryMode, QueryTemplate, SparqlEndpoint};
use nomen_common::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use rphonetic::{DoubleMetaphone, Encoder};
use tracing::{debug, info, warn};

/// Weight of the surname-contains-occupation signal
const LEXICAL_WEIGHT: f64 = 0.7;
/// Weight of the surname/occupation sound-alike signal
const PHONETIC_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub clusters: Vec<String>,
    /// Per-occupation result cap
    pub limit: u32,
    /// Comma list of label languages
    pub langs: String,
    pub mode: DiscoveryMode,
    /// Candidates scoring below this are dropped
    pub min_match: f64,
    pub outfile: PathBuf,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            clusters: vec!["Trades".to_string()],
            limit: 40,
            langs: "en".to_string(),
            mode: DiscoveryMode::Open,
            min_match: 0.0,
            outfile: PathBuf::from("data/candidates_raw.csv"),
        }
    }
}

/// A candidate row and its surname match score
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub row: CandidateRow,
    pub match_score: f64,
}

/// `0.7·lexical + 0.3·phonetic`, in [0, 1]
///
/// Lexical is 1 when the surname contains the occupation (case-insensitive).
/// Phonetic is the normalized Levenshtein similarity of the primary Double
/// Metaphone codes of the surname and the occupation, 0 when either code is
/// empty.
pub fn match_score(surname: &str, occupation: &str) -> f64 {
    let surname = surname.trim();
    let occupation = occupation.trim();

    let lexical = if !occupation.is_empty()
        && surname.to_lowercase().contains(&occupation.to_lowercase())
    {
        1.0
    } else {
        0.0
    };

    LEXICAL_WEIGHT * lexical + PHONETIC_WEIGHT * phonetic_similarity(surname, occupation)
}

fn phonetic_similarity(a: &str, b: &str) -> f64 {
    let encoder = DoubleMetaphone::default();
    let (code_a, code_b) = (encoder.encode(a), encoder.encode(b));
    if code_a.is_empty() || code_b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&code_a, &code_b)
}

/// Query every (cluster, occupation) pair and collect scored candidates
///
/// Unknown clusters and occupations without prefixes are skipped with a log
/// line; a failed query skips its occupation. Candidates are ordered by
/// descending score, query order breaking ties.
pub async fn discover(
    endpoint: &dyn SparqlEndpoint,
    dicts: &DiscoveryDictionaries,
    template: &QueryTemplate,
    options: &DiscoveryOptions,
) -> Result<Vec<Candidate>> {
    let mut plan: Vec<(&str, &str)> = Vec::new();
    for cluster in &options.clusters {
        match dicts.occupations(cluster) {
            Some(occupations) => plan.extend(occupations.iter().map(|o| (cluster.as_str(), o.as_str()))),
            None => warn!(cluster = %cluster, "Unknown cluster, skipping"),
        }
    }
    info!(
        clusters = ?options.clusters,
        occupations = plan.len(),
        mode = %options.mode,
        "Starting discovery"
    );
    if plan.is_empty() {
        warn!("No occupations found for the requested clusters");
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    let mut seen = HashSet::new();
    let mut logged_query = false;

    for (cluster, occupation) in plan {
        let prefixes = dicts.prefixes(occupation);
        let Some(pattern) = surname_pattern(prefixes) else {
            info!(occupation, "No surname prefixes, skipping");
            continue;
        };

        let query = template.render(
            &options.langs,
            options.limit,
            &pattern,
            &options.mode.occupation_filter(occupation),
        );
        if !logged_query {
            debug!(query = %query, "First compiled discovery query");
            logged_query = true;
        }

        let rows = match endpoint.select("discover candidates", &query).await {
            Ok(rows) => rows,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(occupation, error = %e, "Discovery query failed, skipping");
                continue;
            }
        };
        info!(occupation, cluster, rows = rows.len(), "Discovery results");

        for binding in &rows {
            let row = CandidateRow {
                person: binding_text(binding, "person"),
                person_label: binding_text(binding, "personLabel"),
                surname_label: binding_text(binding, "surnameLabel"),
                occupation_label: binding_text(binding, "occupationLabel"),
                cluster: cluster.to_string(),
            };
            if row.person.is_empty() {
                continue;
            }
            if !seen.insert((row.person.clone(), row.occupation_label.to_lowercase())) {
                continue;
            }

            let score = match_score(&row.surname_label, occupation);
            if score < options.min_match {
                debug!(person = %row.person, score, "Below minimum match, dropped");
                continue;
            }
            candidates.push(Candidate {
                row,
                match_score: score,
            });
        }
    }

    candidates.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    Ok(candidates)
}

/// Discover and write the candidates CSV
///
/// Returns the number of rows written. Nothing is written when discovery
/// finds no candidates.
pub async fn run_discovery(
    endpoint: &dyn SparqlEndpoint,
    dicts: &DiscoveryDictionaries,
    template: &QueryTemplate,
    options: &DiscoveryOptions,
) -> Result<usize> {
    let candidates = discover(endpoint, dicts, template, options).await?;
    if candidates.is_empty() {
        info!("No candidates produced; nothing written");
        return Ok(0);
    }

    let rows: Vec<CandidateRow> = candidates.into_iter().map(|c| c.row).collect();
    write_candidates(&options.outfile, &rows)
}
