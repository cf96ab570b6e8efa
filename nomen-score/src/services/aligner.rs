//! Etymology → profession aligner pass
//!
//! Compares each record's `name_roots` with the keywords of its profession
//! (`profession_canonical`, else `np_prof_pred`) and writes the score, tier
//! and rationale. The rationale replaces any earlier one in `name_meaning`.

use super::fields;
use super::write_record;
use crate::alignment::{self, Alignment};
use crate::lexicon::ProfessionKeywords;
use nomen_common::airtable::{FieldKey, FieldSpec, Fields, Record, RecordStore, SchemaMapping};
use nomen_common::{Error, Result, RunSummary};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Target used when a record has neither a profession nor a prediction
pub const UNKNOWN_TARGET: &str = "(unknown)";

const RATIONALE_PREFIX: &str = "Rationale:";

#[derive(Debug, Clone)]
pub struct AlignOptions {
    pub dry_run: bool,
    pub write_delay: Duration,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            write_delay: Duration::from_millis(100),
        }
    }
}

const SPECS: &[FieldSpec] = &[
    fields::NAME_ROOTS,
    fields::OCCUPATION,
    fields::PREDICTED_PROFESSION,
    fields::NAME_MEANING,
    fields::ETYMOLOGY_EXPLAIN,
    fields::ETYMOLOGY_SCORE,
    fields::ETYMOLOGY_MATCH,
];

/// Roots stored as a JSON list, either as text or as a native array
pub fn parse_roots(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => serde_json::from_str(s)
            .map_err(|e| Error::Data(format!("name_roots is not a JSON string list: {}", e))),
        Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|e| Error::Data(format!("name_roots is not a string list: {}", e))),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::Data(format!("name_roots has unexpected type: {}", other))),
    }
}

/// Existing gloss without earlier rationale lines, followed by `rationale`
pub fn merge_meaning(existing: &str, rationale: &str) -> String {
    let gloss = existing
        .lines()
        .filter(|line| !line.trim_start().starts_with(RATIONALE_PREFIX))
        .collect::<Vec<_>>()
        .join("\n");
    let gloss = gloss.trim();

    if gloss.is_empty() {
        rationale.to_string()
    } else {
        format!("{}\n{}", gloss, rationale)
    }
}

fn target_for(record: &Record, mapping: &SchemaMapping) -> String {
    [FieldKey::Occupation, FieldKey::ProfessionPrediction]
        .into_iter()
        .map(|key| record.text(mapping.get(key)))
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TARGET.to_string())
}

fn alignment_fields(record: &Record, mapping: &SchemaMapping, alignment: &Alignment) -> Fields {
    let rationale = alignment.rationale();
    let mut out = Fields::new();

    if let Some(f) = mapping.get(FieldKey::NameMeaning) {
        let merged = merge_meaning(&record.text(Some(f)), &rationale);
        out.insert(f.to_string(), Value::from(merged));
    }
    if let Some(f) = mapping.get(FieldKey::EtymologyExplain) {
        out.insert(f.to_string(), Value::from(rationale.clone()));
    }
    if let Some(f) = mapping.get(FieldKey::EtymologyScore) {
        out.insert(f.to_string(), Value::from(alignment.rounded_score()));
    }
    if let Some(f) = mapping.get(FieldKey::EtymologyMatch) {
        out.insert(f.to_string(), Value::from(alignment.tier.as_str()));
    }
    out
}

/// Run the aligner over every record in `store`
pub async fn run_align(
    store: &dyn RecordStore,
    keywords: &ProfessionKeywords,
    options: &AlignOptions,
) -> Result<RunSummary> {
    info!(dry_run = options.dry_run, "Starting etymology aligner");

    let schema = store.table_schema().await?;
    let mapping = SchemaMapping::resolve(SPECS, &schema)?;
    mapping.log("align");

    let records = store.list_records().await?;
    let mut summary = RunSummary::default();

    for record in &records {
        let raw = mapping
            .get(FieldKey::NameRoots)
            .and_then(|f| record.fields.get(f));
        let roots = match raw.map(parse_roots).transpose() {
            Ok(Some(roots)) if !roots.is_empty() => roots,
            Ok(_) => {
                debug!(record = %record.id, "No name roots, skipping");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(record = %record.id, error = %e, "Malformed name roots, skipping");
                summary.skipped += 1;
                continue;
            }
        };

        let target = target_for(record, &mapping);
        let alignment = alignment::align(keywords, roots.iter().map(String::as_str), &target);
        debug!(record = %record.id, rationale = %alignment.rationale(), "Aligned");

        let out = alignment_fields(record, &mapping, &alignment);
        write_record(
            store,
            &record.id,
            out,
            options.dry_run,
            options.write_delay,
            &mut summary,
        )
        .await;
    }

    summary.log("align");
    Ok(summary)
}
