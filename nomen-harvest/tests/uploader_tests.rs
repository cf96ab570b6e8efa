//! Candidates CSV upload into an in-memory table

use nomen_common::airtable::types::{FieldDef, FieldOptions, SelectChoice};
use nomen_common::airtable::{MemoryStore, Record, TableSchema};
use nomen_common::Error;
use nomen_harvest::candidates::write_candidates;
use nomen_harvest::services::{run_upload, UploadOptions};
use nomen_harvest::CandidateRow;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn text_field(name: &str) -> FieldDef {
    FieldDef {
        id: None,
        name: name.to_string(),
        field_type: "singleLineText".to_string(),
        options: None,
    }
}

fn select_field(name: &str, choices: &[&str]) -> FieldDef {
    FieldDef {
        id: None,
        name: name.to_string(),
        field_type: "singleSelect".to_string(),
        options: Some(FieldOptions {
            choices: choices
                .iter()
                .map(|c| SelectChoice {
                    id: None,
                    name: c.to_string(),
                })
                .collect(),
        }),
    }
}

fn full_schema() -> TableSchema {
    TableSchema::from_defs(vec![
        text_field("full_name"),
        text_field("given_name"),
        text_field("surname"),
        text_field("occupation"),
        select_field("profession_cluster", &["Trades", "Food"]),
        text_field("wikidata_id"),
        text_field("language_origin"),
    ])
}

fn record(id: &str, fields: Value) -> Record {
    Record::new(id, fields.as_object().cloned().unwrap())
}

fn candidate(qid: &str, name: &str, occupation: &str, cluster: &str) -> CandidateRow {
    CandidateRow {
        person: format!("http://www.wikidata.org/entity/{}", qid),
        person_label: name.to_string(),
        surname_label: name.split_whitespace().last().unwrap_or("").to_string(),
        occupation_label: occupation.to_string(),
        cluster: cluster.to_string(),
    }
}

fn write_csv(dir: &Path, rows: &[CandidateRow]) -> PathBuf {
    let path = dir.join("candidates_raw.csv");
    write_candidates(&path, rows).unwrap();
    path
}

fn options(csv: PathBuf) -> UploadOptions {
    UploadOptions {
        csv,
        lang: None,
        dry_run: false,
    }
}

/// TC-UP-001: Upsert by Wikidata id with sanitized cluster and language
#[tokio::test]
async fn tc_up_001_upsert_by_wikidata_id() {
    // Given: one existing record with the first candidate's id
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            candidate("Q1", "Hans Becker", "baker", "food"),
            candidate("Q2", "Anna Schmidt", "smith", "Trades"),
            candidate("Q3", "Piet Visser", "fisher", "Agriculture"),
        ],
    );
    let store = MemoryStore::new(vec![record(
        "recOld",
        json!({"wikidata_id": "http://www.wikidata.org/entity/Q1", "full_name": "Old Name"}),
    )])
    .with_schema(full_schema());

    // When: uploading with a language
    let opts = UploadOptions {
        lang: Some("de".to_string()),
        ..options(csv)
    };
    let summary = run_upload(&store, &opts).await.unwrap();

    // Then: one patch batch, one create batch
    assert_eq!(summary.updated, 3);
    assert_eq!(store.write_calls(), 2);

    let old = store.record("recOld").unwrap();
    assert_eq!(old.text(Some("full_name")), "Hans Becker");
    assert_eq!(old.text(Some("given_name")), "Hans");
    assert_eq!(old.text(Some("surname")), "Becker");
    assert_eq!(old.text(Some("profession_cluster")), "Food");
    assert_eq!(old.text(Some("language_origin")), "de");

    // Cluster outside the select choices is left out
    let piet = store
        .records()
        .into_iter()
        .find(|r| r.text(Some("full_name")) == "Piet Visser")
        .unwrap();
    assert!(!piet.fields.contains_key("profession_cluster"));
    assert_eq!(piet.text(Some("occupation")), "fisher");
}

/// TC-UP-002: Without an id column rows match on name + occupation
#[tokio::test]
async fn tc_up_002_upsert_by_name_and_occupation() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            candidate("Q1", "Hans Becker", "baker", "Food"),
            candidate("Q4", "Hans Becker", "brewer", "Food"),
        ],
    );
    let store = MemoryStore::new(vec![record(
        "recHans",
        json!({"Full Name": "Hans Becker", "occupation": "baker"}),
    )])
    .with_schema(TableSchema::from_defs(vec![
        text_field("Full Name"),
        text_field("occupation"),
    ]));

    let summary = run_upload(&store, &options(csv)).await.unwrap();

    assert_eq!(summary.updated, 2);
    let records = store.records();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .any(|r| r.id != "recHans" && r.text(Some("occupation")) == "brewer"));
}

/// TC-UP-003: Rows are written in batches of ten
#[tokio::test]
async fn tc_up_003_batches_of_ten() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<CandidateRow> = (0..25)
        .map(|i| candidate(&format!("Q{}", 100 + i), &format!("Person {}", i), "baker", "Food"))
        .collect();
    let csv = write_csv(dir.path(), &rows);
    let store = MemoryStore::new(Vec::new()).with_schema(full_schema());

    let summary = run_upload(&store, &options(csv)).await.unwrap();

    assert_eq!(summary.updated, 25);
    assert_eq!(store.records().len(), 25);
    assert_eq!(store.write_calls(), 3);
}

/// TC-UP-004: Duplicate rows are skipped, dry-run writes nothing
#[tokio::test]
async fn tc_up_004_dry_run_with_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            candidate("Q1", "Hans Becker", "baker", "Food"),
            candidate("Q1", "Hans Becker", "Baker", "Food"),
            candidate("Q2", "Anna Schmidt", "smith", "Trades"),
        ],
    );
    let store = MemoryStore::new(Vec::new()).with_schema(full_schema());
    let opts = UploadOptions {
        dry_run: true,
        ..options(csv)
    };

    let summary = run_upload(&store, &opts).await.unwrap();

    assert_eq!(summary.would_update, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.write_calls(), 0);
}

/// TC-UP-005: A rejected batch ends the upload
#[tokio::test]
async fn tc_up_005_batch_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &[candidate("Q1", "Hans Becker", "baker", "Food")]);
    let store = MemoryStore::new(Vec::new())
        .with_schema(full_schema())
        .failing_batches();

    let err = run_upload(&store, &options(csv)).await.unwrap_err();

    assert_eq!(err.status(), Some(422));
}

/// TC-UP-006: A missing CSV is an IO error
#[tokio::test]
async fn tc_up_006_missing_csv() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new(Vec::new()).with_schema(full_schema());

    let err = run_upload(&store, &options(dir.path().join("absent.csv")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}

/// TC-UP-007: Malformed CSV rows are counted as failed, the rest upload
#[tokio::test]
async fn tc_up_007_partial_csv_is_uploaded() {
    // Given: a CSV with a ragged row between two good ones
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("candidates_raw.csv");
    std::fs::write(
        &csv,
        "person,personLabel,surnameLabel,occupationLabel,cluster\n\
         http://www.wikidata.org/entity/Q1,Hans Becker,Becker,baker,Food\n\
         Q2,Bad Row\n\
         http://www.wikidata.org/entity/Q3,Anna Schmidt,Schmidt,smith,Trades\n",
    )
    .unwrap();
    let store = MemoryStore::new(Vec::new()).with_schema(full_schema());

    // When: uploading
    let summary = run_upload(&store, &options(csv)).await.unwrap();

    // Then: the good rows are created and the bad one is counted
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.failed, 1);
    let names: Vec<String> = store
        .records()
        .iter()
        .map(|r| r.text(Some("full_name")))
        .collect();
    assert!(names.contains(&"Hans Becker".to_string()));
    assert!(names.contains(&"Anna Schmidt".to_string()));
    assert!(!names.contains(&"Bad Row".to_string()));
}
