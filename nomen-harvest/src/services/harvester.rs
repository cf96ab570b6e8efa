//! People-by-occupation harvester
//!
//! **Flow:**
//! 1. Resolve each English profession label to an occupation QID
//! 2. Fetch people per QID (optionally including subclasses)
//! 3. Drop nameless/occupationless rows, dedup on (full_name, occupation)
//! 4. Upsert: find by `full_name` + `profession_canonical`, patch or create

use super::fields;
use crate::dictionaries::DEFAULT_PROFESSION_LABELS;
use crate::wikidata::query::{self, is_item_id, item_id};
use crate::wikidata::{binding_lang, binding_text, Binding, SparqlEndpoint};
use nomen_common::airtable::{FieldKey, FieldSpec, Fields, RecordStore, SchemaMapping};
use nomen_common::{Error, Result, RunSummary};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_LANGUAGE: &str = "en";

const SPECS: &[FieldSpec] = &[
    fields::FULL_NAME,
    fields::GIVEN_NAME,
    fields::SURNAME,
    fields::PROFESSION,
    fields::LANGUAGE_ORIGIN,
];

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// English occupation labels to resolve
    pub labels: Vec<String>,
    pub limit_per_profession: u32,
    /// Match subclasses of each occupation as well
    pub transitive: bool,
    pub dry_run: bool,
    pub write_delay: Duration,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            labels: DEFAULT_PROFESSION_LABELS.iter().map(|l| l.to_string()).collect(),
            limit_per_profession: 40,
            transitive: false,
            dry_run: false,
            write_delay: Duration::from_millis(100),
        }
    }
}

/// One person/occupation row from Wikidata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub full_name: String,
    pub given_name: String,
    pub surname: String,
    pub occupation: String,
    /// Language tag of the person label
    pub language: String,
}

/// Label text, empty when the label service echoed a bare item id
fn label_text(binding: &Binding, var: &str) -> String {
    let text = binding_text(binding, var);
    if is_item_id(&text) {
        String::new()
    } else {
        text
    }
}

impl PersonRow {
    /// Row from a people query result; `None` without a name or occupation
    pub fn from_binding(binding: &Binding) -> Option<Self> {
        let given_name = label_text(binding, "givenNameLabel");
        let surname = label_text(binding, "familyNameLabel");
        let occupation = label_text(binding, "occupationLabel");

        let mut full_name = label_text(binding, "personLabel");
        if full_name.is_empty() {
            full_name = format!("{} {}", given_name, surname).trim().to_string();
        }
        if full_name.is_empty() || occupation.is_empty() {
            return None;
        }

        Some(Self {
            full_name,
            given_name,
            surname,
            occupation,
            language: binding_lang(binding, "personLabel")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }

    /// Case-insensitive identity within one harvest
    pub fn dedup_key(&self) -> (String, String) {
        (self.full_name.to_lowercase(), self.occupation.to_lowercase())
    }

    fn fields(&self, mapping: &SchemaMapping) -> Fields {
        let values = [
            (FieldKey::FullName, &self.full_name),
            (FieldKey::GivenName, &self.given_name),
            (FieldKey::Surname, &self.surname),
            (FieldKey::Occupation, &self.occupation),
            (FieldKey::Language, &self.language),
        ];

        let mut out = Fields::new();
        for (key, value) in values {
            if let Some(column) = mapping.get(key) {
                out.insert(column.to_string(), Value::from(value.as_str()));
            }
        }
        out
    }
}

/// Keep the first row for every (full_name, occupation) pair
pub fn dedup_people(rows: Vec<PersonRow>) -> Vec<PersonRow> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|r| seen.insert(r.dedup_key())).collect()
}

/// Resolve labels to occupation QIDs, skipping labels that do not resolve
pub async fn resolve_professions(
    endpoint: &dyn SparqlEndpoint,
    labels: &[String],
) -> Result<Vec<(String, String)>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for label in labels.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        let rows = match endpoint
            .select("resolve occupation", &query::occupation_lookup(label))
            .await
        {
            Ok(rows) => rows,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(label, error = %e, "Occupation lookup failed, skipping");
                continue;
            }
        };

        let qid = rows
            .first()
            .map(|row| binding_text(row, "occ"))
            .and_then(|uri| item_id(&uri).map(str::to_string));

        match qid {
            Some(qid) if seen.insert(qid.clone()) => {
                debug!(label, qid = %qid, "Resolved occupation");
                resolved.push((label.to_string(), qid));
            }
            Some(qid) => debug!(label, qid = %qid, "Occupation already resolved"),
            None => warn!(label, "No occupation QID for label, skipping"),
        }
    }

    Ok(resolved)
}

/// People with occupation `qid`
pub async fn fetch_people(
    endpoint: &dyn SparqlEndpoint,
    qid: &str,
    limit: u32,
    transitive: bool,
) -> Result<Vec<PersonRow>> {
    if !is_item_id(qid) {
        return Err(Error::Data(format!("not a Wikidata item id: {}", qid)));
    }

    let rows = endpoint
        .select(
            "fetch people",
            &query::people_by_occupation(qid, limit, transitive),
        )
        .await?;
    Ok(rows.iter().filter_map(PersonRow::from_binding).collect())
}

/// Run the harvester, upserting into `store`
///
/// Fails with `InsufficientData` when no label resolves.
pub async fn run_harvest(
    endpoint: &dyn SparqlEndpoint,
    store: &dyn RecordStore,
    options: &HarvestOptions,
) -> Result<RunSummary> {
    info!(
        labels = options.labels.len(),
        limit = options.limit_per_profession,
        transitive = options.transitive,
        dry_run = options.dry_run,
        "Starting harvest"
    );

    let professions = resolve_professions(endpoint, &options.labels).await?;
    if professions.is_empty() {
        return Err(Error::InsufficientData(
            "no profession labels resolved to occupation QIDs; adjust WIKIDATA_PROF_LIST".to_string(),
        ));
    }
    info!(professions = professions.len(), "Resolved professions");

    let mut summary = RunSummary::default();
    let mut people = Vec::new();
    for (label, qid) in &professions {
        match fetch_people(endpoint, qid, options.limit_per_profession, options.transitive).await {
            Ok(rows) => {
                debug!(label = %label, qid = %qid, rows = rows.len(), "Fetched people");
                people.extend(rows);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(label = %label, qid = %qid, error = %e, "People query failed, skipping");
                summary.failed += 1;
            }
        }
    }

    let people = dedup_people(people);
    info!(rows = people.len(), "Fetched rows");
    if people.is_empty() {
        info!("Nothing fetched");
        summary.log("harvest");
        return Ok(summary);
    }

    let schema = store.table_schema().await?;
    let mapping = SchemaMapping::resolve(SPECS, &schema)?;
    mapping.log("harvest");
    let (Some(name_column), Some(profession_column)) = (
        mapping.get(FieldKey::FullName),
        mapping.get(FieldKey::Occupation),
    ) else {
        return Err(Error::Config("no full name or profession column to upsert on".to_string()));
    };

    let mut created = 0usize;
    let mut patched = 0usize;
    for person in &people {
        let fields = person.fields(&mapping);
        if options.dry_run {
            summary.would_update += 1;
            continue;
        }

        let criteria = [
            (name_column, person.full_name.as_str()),
            (profession_column, person.occupation.as_str()),
        ];
        let existing = match store.find_first(&criteria).await {
            Ok(existing) => existing,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(name = %person.full_name, error = %e, "Lookup failed, skipping");
                summary.failed += 1;
                continue;
            }
        };

        let written = match existing {
            Some(record) => store.patch_record(&record.id, fields).await.map(|()| true),
            None => store.create_records(vec![fields]).await.map(|_| false),
        };
        match written {
            Ok(was_patched) => {
                if was_patched {
                    patched += 1;
                } else {
                    created += 1;
                }
                summary.updated += 1;
                if !options.write_delay.is_zero() {
                    tokio::time::sleep(options.write_delay).await;
                }
            }
            Err(e) => {
                warn!(name = %person.full_name, error = %e, "Upsert failed");
                summary.failed += 1;
            }
        }
    }

    info!(created, patched, "Upserted people");
    summary.log("harvest");
    Ok(summary)
}
