//! Candidates CSV → Airtable uploader
//!
//! Columns are matched against the table's real field names. Rows are upserted
//! in groups of [`MAX_BATCH`]: by Wikidata URI when the table has an id
//! column, else by full name + occupation. A rejected batch ends the run.

use super::fields;
use crate::candidates::{read_candidates, CandidateRow};
use nomen_common::airtable::schema::pick_all;
use nomen_common::airtable::{FieldKey, FieldSpec, Fields, RecordStore, SchemaMapping, MAX_BATCH};
use nomen_common::{Result, RunSummary};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const SPECS: &[FieldSpec] = &[
    fields::UPLOAD_FULL_NAME,
    fields::UPLOAD_GIVEN_NAME,
    fields::UPLOAD_SURNAME,
    fields::UPLOAD_OCCUPATION,
    fields::UPLOAD_CLUSTER,
    fields::UPLOAD_WIKIDATA_ID,
];

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub csv: PathBuf,
    /// Written to every language-like column
    pub lang: Option<String>,
    pub dry_run: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("data/candidates_raw.csv"),
            lang: None,
            dry_run: false,
        }
    }
}

/// Fields for one row plus the criteria identifying an existing record
#[derive(Debug, Clone, PartialEq)]
struct Prepared {
    fields: Fields,
    lookup: Vec<(String, String)>,
}

impl Prepared {
    fn dedup_key(&self) -> Option<Vec<String>> {
        (!self.lookup.is_empty()).then(|| {
            self.lookup
                .iter()
                .map(|(_, value)| value.to_lowercase())
                .collect()
        })
    }
}

fn prepare(
    row: &CandidateRow,
    mapping: &SchemaMapping,
    language_fields: &[String],
    lang: Option<&str>,
) -> Option<Prepared> {
    let person = row.person.trim();
    let name = row.person_label.trim();
    if person.is_empty() && name.is_empty() {
        return None;
    }
    let given = name.split_whitespace().next().unwrap_or("");
    let occupation = row.occupation_label.trim();

    let mut fields = Fields::new();
    let mut put = |key: FieldKey, value: &str| {
        if let (Some(column), false) = (mapping.get(key), value.is_empty()) {
            fields.insert(column.to_string(), Value::from(value));
        }
    };
    put(FieldKey::WikidataId, person);
    put(FieldKey::FullName, name);
    put(FieldKey::GivenName, given);
    put(FieldKey::Surname, row.surname_label.trim());
    put(FieldKey::Occupation, occupation);

    match mapping.sanitize_select(FieldKey::Cluster, &row.cluster) {
        Some(cluster) => put(FieldKey::Cluster, &cluster),
        None if mapping.get(FieldKey::Cluster).is_some() && !row.cluster.trim().is_empty() => {
            debug!(cluster = %row.cluster, "Cluster not an allowed option, skipped");
        }
        None => {}
    }

    if let Some(lang) = lang.map(str::trim).filter(|l| !l.is_empty()) {
        for column in language_fields {
            fields.insert(column.clone(), Value::from(lang));
        }
    }

    if fields.is_empty() {
        return None;
    }

    let lookup = match (
        mapping.get(FieldKey::WikidataId),
        mapping.get(FieldKey::FullName),
        mapping.get(FieldKey::Occupation),
    ) {
        (Some(id), _, _) if !person.is_empty() => vec![(id.to_string(), person.to_string())],
        (_, Some(full), Some(occ)) if !name.is_empty() && !occupation.is_empty() => vec![
            (full.to_string(), name.to_string()),
            (occ.to_string(), occupation.to_string()),
        ],
        _ => Vec::new(),
    };

    Some(Prepared { fields, lookup })
}

/// Upload the candidates CSV into `store`
pub async fn run_upload(store: &dyn RecordStore, options: &UploadOptions) -> Result<RunSummary> {
    info!(csv = %options.csv.display(), dry_run = options.dry_run, "Starting upload");

    let sheet = read_candidates(&options.csv)?;
    info!(rows = sheet.rows.len(), rejected = sheet.rejected, "Read candidates");

    let schema = store.table_schema().await?;
    let mapping = SchemaMapping::resolve(SPECS, &schema)?;
    mapping.log("upload");
    let language_fields = match options.lang.as_deref() {
        Some(lang) if !lang.trim().is_empty() => pick_all(&schema.fields, fields::LANGUAGE_ALIASES),
        _ => Vec::new(),
    };
    if !language_fields.is_empty() {
        info!(columns = ?language_fields, "Language targets");
    }

    let mut summary = RunSummary {
        failed: sheet.rejected,
        ..RunSummary::default()
    };
    let mut seen = HashSet::new();
    let mut prepared = Vec::new();
    for row in &sheet.rows {
        match prepare(row, &mapping, &language_fields, options.lang.as_deref()) {
            Some(p) if p.dedup_key().map(|k| seen.insert(k)).unwrap_or(true) => prepared.push(p),
            Some(_) => {
                debug!(person = %row.person, "Duplicate row, skipped");
                summary.skipped += 1;
            }
            None => summary.skipped += 1,
        }
    }

    if options.dry_run {
        summary.would_update = prepared.len();
        summary.log("upload");
        return Ok(summary);
    }

    let mut created = 0;
    let mut patched = 0;
    for (index, batch) in prepared.chunks(MAX_BATCH).enumerate() {
        let mut updates = Vec::new();
        let mut creates = Vec::new();

        for p in batch {
            if p.lookup.is_empty() {
                creates.push(p.fields.clone());
                continue;
            }
            let criteria: Vec<(&str, &str)> = p
                .lookup
                .iter()
                .map(|(field, value)| (field.as_str(), value.as_str()))
                .collect();
            match store.find_first(&criteria).await {
                Ok(Some(existing)) => updates.push((existing.id, p.fields.clone())),
                Ok(None) => creates.push(p.fields.clone()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Lookup failed, row skipped");
                    summary.failed += 1;
                }
            }
        }

        if !updates.is_empty() {
            patched += store.patch_records(updates).await?;
        }
        if !creates.is_empty() {
            created += store.create_records(creates).await?;
        }
        info!(batch = index + 1, created, patched, "Batch uploaded");
    }

    summary.updated = created + patched;
    info!(created, patched, "Upload complete");
    summary.log("upload");
    Ok(summary)
}
