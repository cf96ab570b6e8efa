//! Analyzer pass against an in-memory table
//!
//! Toy dataset: two Trades rows sharing German surname fragments, one Science
//! row, plus unlabeled, locked and blank rows.

use nomen_common::airtable::types::FieldDef;
use nomen_common::airtable::{MemoryStore, Record, RecordStore, TableSchema};
use nomen_common::Error;
use nomen_score::services::{run_analyze, run_enrich, AnalyzeOptions, EnrichOptions, LabelSource};
use nomen_score::Lexicon;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

fn text_field(name: &str) -> FieldDef {
    FieldDef {
        id: None,
        name: name.to_string(),
        field_type: "singleLineText".to_string(),
        options: None,
    }
}

fn schema(names: &[&str]) -> TableSchema {
    TableSchema::from_defs(names.iter().map(|n| text_field(n)).collect())
}

fn record(id: &str, fields: Value) -> Record {
    Record::new(id, fields.as_object().cloned().unwrap())
}

const CLUSTER_COLUMNS: &[&str] = &[
    "full_name",
    "profession_cluster",
    "np_cluster_pred",
    "np_cluster_score",
    "np_token_explain",
    "np_status",
    "np_lock",
];

fn toy_records() -> Vec<Record> {
    vec![
        record("recHans", json!({"full_name": "Hans Schmidt", "profession_cluster": "Trades"})),
        record("recOtto", json!({"full_name": "Otto Müller", "profession_cluster": "Trades"})),
        record("recMarie", json!({"full_name": "Marie Curie", "profession_cluster": "Science"})),
        record("recFritz", json!({"full_name": "Fritz Schmidt"})),
        record("recAda", json!({"full_name": "Ada Lovelace"})),
        record("recKarl", json!({"full_name": "Karl Schmidt", "np_lock": true})),
        record("recBlank", json!({"full_name": "  "})),
    ]
}

fn toy_store() -> MemoryStore {
    MemoryStore::new(toy_records()).with_schema(schema(CLUSTER_COLUMNS))
}

fn options() -> AnalyzeOptions {
    AnalyzeOptions {
        threshold: 0.8,
        dry_run: false,
        label: LabelSource::Cluster,
        write_delay: Duration::ZERO,
    }
}

fn field(store: &MemoryStore, id: &str, name: &str) -> Option<Value> {
    store.record(id).and_then(|r| r.fields.get(name).cloned())
}

/// TC-AN-001: Confident predictions are written with score, explanation and status
#[tokio::test]
async fn tc_an_001_writes_confident_predictions() {
    // Given: the toy table
    let store = toy_store();

    // When: analyzing with the default threshold
    let summary = run_analyze(&store, &options()).await.unwrap();

    // Then: Fritz Schmidt is predicted Trades
    assert_eq!(field(&store, "recFritz", "np_cluster_pred"), Some(json!("Trades")));

    let score = field(&store, "recFritz", "np_cluster_score")
        .and_then(|v| v.as_f64())
        .unwrap();
    assert!(score >= 0.8);
    assert_eq!(score, (score * 1000.0).round() / 1000.0);

    let explain = field(&store, "recFritz", "np_token_explain").unwrap();
    assert!(explain.as_str().unwrap().starts_with("best=Trades, gap="));

    let status = field(&store, "recFritz", "np_status").unwrap();
    assert!(status.as_str().unwrap().starts_with("updated@"));
    assert!(status.as_str().unwrap().ends_with('Z'));

    // Labeled rows are re-predicted too
    assert_eq!(field(&store, "recMarie", "np_cluster_pred"), Some(json!("Science")));
    assert_eq!(summary.updated, 4);
    assert_eq!(summary.failed, 0);
}

/// TC-AN-002: Below-threshold rows only get a skipped status
#[tokio::test]
async fn tc_an_002_weak_rows_are_annotated() {
    let store = toy_store();

    let summary = run_analyze(&store, &options()).await.unwrap();

    // Ada Lovelace shares no tokens with any labeled row → gap 0
    assert_eq!(summary.weak, 1);
    assert!(field(&store, "recAda", "np_cluster_pred").is_none());
    let status = field(&store, "recAda", "np_status").unwrap();
    assert!(status
        .as_str()
        .unwrap()
        .starts_with("skipped<threshold:0.8 @ "));
}

/// TC-AN-003: Locked and blank rows are never written
#[tokio::test]
async fn tc_an_003_locked_and_blank_rows_untouched() {
    let store = toy_store();

    let summary = run_analyze(&store, &options()).await.unwrap();

    assert_eq!(summary.locked, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.record("recKarl").unwrap().fields.len(), 2);
    assert_eq!(store.record("recBlank").unwrap().fields.len(), 1);
}

/// TC-AN-004: Dry run counts without writing anything
#[tokio::test]
async fn tc_an_004_dry_run_writes_nothing() {
    let store = toy_store();
    let options = AnalyzeOptions {
        dry_run: true,
        ..options()
    };

    let summary = run_analyze(&store, &options).await.unwrap();

    assert_eq!(summary.would_update, 4);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.weak, 1);
    assert_eq!(store.write_calls(), 0);
    assert_eq!(store.records(), toy_records());
}

/// TC-AN-005: No labeled rows is an insufficient-data error
#[tokio::test]
async fn tc_an_005_unlabeled_table_fails() {
    let store = MemoryStore::new(vec![
        record("rec1", json!({"full_name": "Fritz Schmidt"})),
        record("rec2", json!({"full_name": "", "profession_cluster": "Trades"})),
    ])
    .with_schema(schema(CLUSTER_COLUMNS));

    let err = run_analyze(&store, &options()).await.unwrap_err();

    assert!(matches!(err, Error::InsufficientData(_)));
    assert_eq!(store.write_calls(), 0);
}

/// TC-AN-006: Profession mode learns only from profession_canonical
#[tokio::test]
async fn tc_an_006_profession_label_mode() {
    let store = MemoryStore::new(vec![
        record("rec1", json!({"full_name": "Hans Schmidt", "profession_canonical": "blacksmith"})),
        record("rec2", json!({"full_name": "Marie Curie", "profession_canonical": "physicist"})),
        // Cluster-only rows are unlabeled in this mode
        record("rec3", json!({"full_name": "Otto Müller", "profession_cluster": "Trades"})),
        record("rec4", json!({"full_name": "Fritz Schmidt"})),
    ])
    .with_schema(schema(&[
        "full_name",
        "profession_cluster",
        "profession_canonical",
        "np_cluster_pred",
        "np_prof_pred",
        "np_prof_score",
        "np_status",
    ]));
    let options = AnalyzeOptions {
        label: LabelSource::Profession,
        ..options()
    };

    run_analyze(&store, &options).await.unwrap();

    assert_eq!(field(&store, "rec4", "np_prof_pred"), Some(json!("blacksmith")));
    assert!(field(&store, "rec4", "np_cluster_pred").is_none());
    assert!(field(&store, "rec4", "np_prof_score").is_some());
}

/// TC-AN-007: A failed patch is counted and the pass continues
#[tokio::test]
async fn tc_an_007_failed_patch_counted() {
    let store = MemoryStore::new(toy_records())
        .with_schema(schema(CLUSTER_COLUMNS))
        .failing_record("recFritz");

    let summary = run_analyze(&store, &options()).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 3);
    assert_eq!(field(&store, "recMarie", "np_cluster_pred"), Some(json!("Science")));
}

/// TC-AN-008: Aliased column names are resolved
#[tokio::test]
async fn tc_an_008_aliased_columns() {
    let store = MemoryStore::new(vec![
        record("rec1", json!({"Full Name": "Hans Schmidt", "Profession Cluster": "Trades"})),
        record("rec2", json!({"Full Name": "Marie Curie", "Profession Cluster": "Science"})),
        record("rec3", json!({"Full Name": "Fritz Schmidt"})),
    ])
    .with_schema(schema(&["Full Name", "Profession Cluster", "np_pred", "Notes"]));

    let summary = run_analyze(&store, &options()).await.unwrap();

    assert_eq!(field(&store, "rec3", "np_pred"), Some(json!("Trades")));
    // Explanation falls back to the notes column
    let notes = field(&store, "rec3", "Notes").unwrap();
    assert!(notes.as_str().unwrap().starts_with("best=Trades"));
    assert_eq!(summary.failed, 0);
}

/// TC-AN-009: Sampled schema still finds the name and label columns
#[tokio::test]
async fn tc_an_009_sampled_schema_is_enough_to_learn() {
    let records = vec![
        record("rec1", json!({"full_name": "Hans Schmidt", "profession_cluster": "Trades", "np_status": ""})),
        record("rec2", json!({"full_name": "Marie Curie", "profession_cluster": "Science"})),
    ];
    let store = MemoryStore::new(records);
    let sampled = store.table_schema().await.unwrap();
    assert!(sampled.fields.contains(&"np_status".to_string()));

    let summary = run_analyze(&store, &options()).await.unwrap();

    // Only the status column exists among the outputs
    assert_eq!(summary.updated, 2);
    assert!(field(&store, "rec1", "np_cluster_pred").is_none());
    assert!(field(&store, "rec1", "np_status")
        .unwrap()
        .as_str()
        .unwrap()
        .starts_with("updated@"));
}

/// TC-AN-010: Punctuation-only names are skipped by scoring and enrichment alike
#[tokio::test]
async fn tc_an_010_punctuation_names_skipped_by_both_passes() {
    // Given: the toy table plus a row whose name parts are all punctuation
    let punct = record(
        "recPunct",
        json!({"full_name": "!!! ...", "given_name": "?", "surname": "."}),
    );
    let mut records = toy_records();
    records.push(punct.clone());
    let mut columns = CLUSTER_COLUMNS.to_vec();
    columns.extend(["given_name", "surname"]);
    let store = MemoryStore::new(records).with_schema(schema(&columns));

    // When: analyzing, then enriching the same table
    let analyzed = run_analyze(&store, &options()).await.unwrap();
    let enriched = run_enrich(
        &store,
        &Lexicon::builtin(),
        &EnrichOptions {
            dry_run: false,
            write_delay: Duration::ZERO,
        },
    )
    .await
    .unwrap();

    // Then: both passes skip it next to the blank row and never write it
    assert_eq!(analyzed.skipped, 2);
    assert_eq!(analyzed.failed, 0);
    assert_eq!(enriched.skipped, 2);
    assert_eq!(enriched.failed, 0);
    assert_eq!(store.record("recPunct"), Some(punct));
    assert!(field(&store, "recFritz", "name_roots").is_some());
}

/// TC-AN-011: Below-threshold status writes honor the write delay
#[tokio::test]
async fn tc_an_011_weak_status_writes_are_paced() {
    // Given: a threshold no prediction can clear
    let store = toy_store();
    let delay = Duration::from_millis(15);
    let options = AnalyzeOptions {
        threshold: 1.0e9,
        write_delay: delay,
        ..options()
    };

    // When: analyzing
    let started = Instant::now();
    let summary = run_analyze(&store, &options).await.unwrap();

    // Then: every scored row is weak and each status write was followed by the delay
    assert_eq!(summary.weak, 5);
    assert_eq!(summary.updated, 0);
    assert_eq!(store.write_calls(), 5);
    assert!(started.elapsed() >= delay * 5);
    assert!(field(&store, "recFritz", "np_status")
        .unwrap()
        .as_str()
        .unwrap()
        .starts_with("skipped<threshold:"));
}
