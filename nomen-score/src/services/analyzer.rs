//! Name → profession analyzer pass
//!
//! Learns PMI from the labeled rows of the table, predicts a label for every
//! row, and writes predictions whose score gap clears the threshold. Rows
//! with a truthy lock flag are never touched.

use super::fields;
use super::{patch_paced, write_record, WriteOutcome};
use crate::pmi::{LabeledExample, PmiModel};
use crate::scorer::{self, Prediction};
use crate::tokenizer::{name_tokens, TokenSet};
use chrono::Utc;
use nomen_common::airtable::{FieldKey, FieldSpec, Fields, Record, RecordStore, SchemaMapping};
use nomen_common::{Result, RunSummary};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Which column supplies training labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSource {
    /// `profession_cluster`; writes `np_cluster_*`
    #[default]
    Cluster,
    /// `profession_canonical`; writes `np_prof_*`
    Profession,
}

impl LabelSource {
    fn specs(self) -> Vec<FieldSpec> {
        let mut specs = vec![
            fields::FULL_NAME,
            fields::GIVEN_NAME,
            fields::SURNAME,
            fields::LOCK,
            fields::STATUS,
        ];
        match self {
            LabelSource::Cluster => specs.extend([
                fields::CLUSTER,
                fields::CLUSTER_PREDICTION,
                fields::CLUSTER_SCORE,
                fields::CLUSTER_EXPLANATION,
            ]),
            LabelSource::Profession => specs.extend([
                fields::OCCUPATION,
                fields::PROFESSION_PREDICTION,
                fields::PROFESSION_SCORE,
                fields::PROFESSION_EXPLANATION,
            ]),
        }
        specs
    }

    fn label_key(self) -> FieldKey {
        match self {
            LabelSource::Cluster => FieldKey::Cluster,
            LabelSource::Profession => FieldKey::Occupation,
        }
    }
}

impl FromStr for LabelSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cluster" => Ok(LabelSource::Cluster),
            "profession" => Ok(LabelSource::Profession),
            other => Err(format!(
                "unknown label source '{}' (expected cluster or profession)",
                other
            )),
        }
    }
}

impl fmt::Display for LabelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LabelSource::Cluster => "cluster",
            LabelSource::Profession => "profession",
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Minimum score gap before a prediction is written
    pub threshold: f64,
    pub dry_run: bool,
    pub label: LabelSource,
    /// Pause after each successful patch
    pub write_delay: Duration,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            dry_run: false,
            label: LabelSource::Cluster,
            write_delay: Duration::from_millis(100),
        }
    }
}

fn record_tokens(record: &Record, mapping: &SchemaMapping) -> TokenSet {
    name_tokens(
        &record.text(mapping.get(FieldKey::FullName)),
        &record.text(mapping.get(FieldKey::GivenName)),
        &record.text(mapping.get(FieldKey::Surname)),
    )
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn prediction_fields(mapping: &SchemaMapping, prediction: &Prediction, stamp: &str) -> Fields {
    let mut out = Fields::new();
    if let Some(f) = mapping.get(FieldKey::Prediction) {
        out.insert(f.to_string(), Value::from(prediction.label.clone()));
    }
    if let Some(f) = mapping.get(FieldKey::PredictionScore) {
        out.insert(f.to_string(), Value::from(round3(prediction.gap)));
    }
    if let Some(f) = mapping.get(FieldKey::Explanation) {
        out.insert(f.to_string(), Value::from(prediction.explain()));
    }
    if let Some(f) = mapping.get(FieldKey::Status) {
        out.insert(f.to_string(), Value::from(format!("updated@{}", stamp)));
    }
    out
}

/// Run the analyzer over every record in `store`
///
/// Fails with `InsufficientData` when no row carries both a label and name
/// tokens.
pub async fn run_analyze(store: &dyn RecordStore, options: &AnalyzeOptions) -> Result<RunSummary> {
    info!(
        threshold = options.threshold,
        dry_run = options.dry_run,
        label = %options.label,
        "Starting analyzer"
    );

    let schema = store.table_schema().await?;
    let mapping = SchemaMapping::resolve(&options.label.specs(), &schema)?;
    mapping.log("analyze");

    let records = store.list_records().await?;
    info!(records = records.len(), "Fetched records");

    let label_field = mapping.get(options.label.label_key());
    let examples: Vec<LabeledExample> = records
        .iter()
        .filter_map(|r| {
            let label = r.text(label_field);
            (!label.is_empty()).then(|| LabeledExample::new(label, record_tokens(r, &mapping)))
        })
        .collect();

    let model = PmiModel::learn(&examples)?;
    info!(
        examples = model.examples(),
        labels = ?model.labels().collect::<Vec<_>>(),
        "PMI model ready"
    );

    let stamp = Utc::now().format("%Y-%m-%dT%H:%MZ").to_string();
    let mut summary = RunSummary::default();

    for record in &records {
        if record.flag(mapping.get(FieldKey::Lock)) {
            debug!(record = %record.id, "Locked, skipping");
            summary.locked += 1;
            continue;
        }

        let tokens = record_tokens(record, &mapping);
        let Some(prediction) = scorer::score(&model, &tokens) else {
            summary.skipped += 1;
            continue;
        };

        if prediction.gap < options.threshold {
            summary.weak += 1;
            let mut out = Fields::new();
            if let Some(status) = mapping.get(FieldKey::Status) {
                out.insert(
                    status.to_string(),
                    Value::from(format!("skipped<threshold:{} @ {}", options.threshold, stamp)),
                );
            }
            // Weak rows stay counted as weak; only a failed status write is added
            let outcome =
                patch_paced(store, &record.id, out, options.dry_run, options.write_delay).await;
            if outcome == WriteOutcome::Failed {
                summary.failed += 1;
            }
            continue;
        }

        debug!(record = %record.id, explain = %prediction.explain(), "Prediction accepted");
        let out = prediction_fields(&mapping, &prediction, &stamp);
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

    summary.log("analyze");
    Ok(summary)
}
