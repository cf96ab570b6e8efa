//! Etymology enricher pass
//!
//! Writes `name_roots` (JSON list) and `etymology_source` for every named
//! record, a `Meaning: ...` gloss only when `name_meaning` is still empty, and
//! `name_origin` from the record's language or the lexicon.

use super::fields;
use super::write_record;
use crate::etymology::{self, Etymology};
use crate::lexicon::Lexicon;
use nomen_common::airtable::{FieldKey, FieldSpec, Fields, Record, RecordStore, SchemaMapping};
use nomen_common::{Result, RunSummary};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub dry_run: bool,
    pub write_delay: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            write_delay: Duration::from_millis(100),
        }
    }
}

const SPECS: &[FieldSpec] = &[
    fields::FULL_NAME,
    fields::GIVEN_NAME,
    fields::SURNAME,
    fields::LANGUAGE,
    fields::NAME_ROOTS,
    fields::NAME_MEANING,
    fields::NAME_ORIGIN,
    fields::ETYMOLOGY_SOURCE,
];

fn enrichment_fields(record: &Record, mapping: &SchemaMapping, etymology: &Etymology) -> Result<Fields> {
    let mut out = Fields::new();

    if let Some(f) = mapping.get(FieldKey::NameRoots) {
        out.insert(f.to_string(), Value::from(serde_json::to_string(&etymology.roots)?));
    }
    if let Some(f) = mapping.get(FieldKey::EtymologySource) {
        out.insert(f.to_string(), Value::from(etymology.source.clone()));
    }

    if let Some(f) = mapping.get(FieldKey::NameMeaning) {
        if !etymology.gloss.is_empty() && record.text(Some(f)).is_empty() {
            out.insert(f.to_string(), Value::from(format!("Meaning: {}", etymology.gloss)));
        }
    }

    if let Some(f) = mapping.get(FieldKey::NameOrigin) {
        let recorded = [mapping.get(FieldKey::Language), Some(f)]
            .into_iter()
            .map(|field| record.text(field))
            .find(|v| !v.is_empty());
        if let Some(origin) = recorded.or_else(|| etymology.origin.clone()) {
            out.insert(f.to_string(), Value::from(origin));
        }
    }

    Ok(out)
}

/// Run the enricher over every record in `store`
pub async fn run_enrich(
    store: &dyn RecordStore,
    lexicon: &Lexicon,
    options: &EnrichOptions,
) -> Result<RunSummary> {
    info!(dry_run = options.dry_run, "Starting etymology enricher");

    let schema = store.table_schema().await?;
    let mapping = SchemaMapping::resolve(SPECS, &schema)?;
    mapping.log("enrich");

    let records = store.list_records().await?;
    let mut summary = RunSummary::default();

    for record in &records {
        let derived = etymology::derive(
            lexicon,
            &record.text(mapping.get(FieldKey::FullName)),
            &record.text(mapping.get(FieldKey::GivenName)),
            &record.text(mapping.get(FieldKey::Surname)),
        );
        let Some(derived) = derived else {
            debug!(record = %record.id, "No name text, skipping");
            summary.skipped += 1;
            continue;
        };

        let out = enrichment_fields(record, &mapping, &derived)?;
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

    summary.log("enrich");
    Ok(summary)
}
