//! AirtableClient against an in-process mock of the Airtable REST API
//!
//! Covers pagination, retry on 429, schema discovery with sampling fallback,
//! formula lookup, batch chunking and error status propagation.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use nomen_common::airtable::{AirtableClient, RecordStore, SchemaSource};
use nomen_common::config::{AirtableConfig, AirtableSettings};
use nomen_common::RetryPolicy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

const TOKEN: &str = "pat123";
const TABLE: &str = "People Table";

#[derive(Clone, Default)]
struct MockState {
    /// (method, path, query-or-body) per request
    log: Arc<Mutex<Vec<(String, String, Value)>>>,
    /// 429 responses still to hand out on list requests
    throttle: Arc<AtomicU32>,
    meta_available: bool,
}

impl MockState {
    fn record(&self, method: &str, path: &str, payload: Value) {
        self.log
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), payload));
    }

    fn requests(&self, method: &str) -> Vec<Value> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| m == method)
            .map(|(_, _, p)| p.clone())
            .collect()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"type": "AUTHENTICATION_REQUIRED"}})),
    )
        .into_response()
}

async fn list_records(
    State(state): State<MockState>,
    Path((_base, table)): Path<(String, String)>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    assert_eq!(table, TABLE);
    state.record("GET", "list", json!(query));

    if state.throttle.load(Ordering::SeqCst) > 0 {
        state.throttle.fetch_sub(1, Ordering::SeqCst);
        return (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response();
    }

    if let Some(formula) = query.get("filterByFormula") {
        let records = if formula.contains("Hans Schmidt") {
            json!([{"id": "rec1", "fields": {"full_name": "Hans Schmidt"}}])
        } else {
            json!([])
        };
        return Json(json!({ "records": records })).into_response();
    }

    let page = match query.get("offset").map(String::as_str) {
        None => json!({
            "records": [
                {"id": "rec1", "fields": {"full_name": "Hans Schmidt", "surname": "Schmidt"}},
                {"id": "rec2", "fields": {"full_name": "Marie Curie", "profession_cluster": "Science"}}
            ],
            "offset": "page2"
        }),
        Some("page2") => json!({
            "records": [{"id": "rec3", "fields": {"full_name": "Ada Lovelace"}}]
        }),
        Some(_) => return (StatusCode::UNPROCESSABLE_ENTITY, "LIST_RECORDS_ITERATOR_NOT_AVAILABLE").into_response(),
    };
    Json(page).into_response()
}

async fn create_records(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.record("POST", "create", body.clone());

    let records: Vec<Value> = body["records"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, r)| json!({"id": format!("recNew{}", i), "fields": r["fields"]}))
        .collect();
    Json(json!({ "records": records })).into_response()
}

async fn patch_records(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.record("PATCH", "batch", body.clone());
    Json(json!({ "records": body["records"] })).into_response()
}

async fn patch_record(
    State(state): State<MockState>,
    Path((_base, _table, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.record("PATCH", &id, body.clone());

    if id == "recBad" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": {"type": "INVALID_MULTIPLE_CHOICE_OPTIONS"}})),
        )
            .into_response();
    }
    Json(json!({"id": id, "fields": body["fields"]})).into_response()
}

async fn meta_tables(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if !state.meta_available {
        return (StatusCode::FORBIDDEN, "INVALID_PERMISSIONS_OR_MODEL_NOT_FOUND").into_response();
    }
    Json(json!({
        "tables": [{
            "id": "tblPeople",
            "name": TABLE,
            "fields": [
                {"id": "fld1", "name": "full_name", "type": "singleLineText"},
                {"id": "fld2", "name": "profession_cluster", "type": "singleSelect",
                 "options": {"choices": [{"id": "sel1", "name": "Trades"}, {"id": "sel2", "name": "Science"}]}}
            ]
        }]
    }))
    .into_response()
}

/// Start the mock server, returning its API root
async fn spawn_mock(state: MockState) -> String {
    let app = Router::new()
        .route("/v0/meta/bases/:base/tables", get(meta_tables))
        .route(
            "/v0/:base/:table",
            get(list_records).post(create_records).patch(patch_records),
        )
        .route("/v0/:base/:table/:id", patch(patch_record))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v0", addr)
}

fn client_for(api_root: &str, token: &str, policy: RetryPolicy) -> AirtableClient {
    let config = AirtableConfig::from_values(
        Some("appTest".to_string()),
        Some(token.to_string()),
        Some(TABLE.to_string()),
        api_root,
    )
    .unwrap();
    let settings = AirtableSettings {
        requests_per_second: 1000,
        ..AirtableSettings::default()
    };
    AirtableClient::new(config, &settings, policy).unwrap()
}

fn fields(value: Value) -> nomen_common::airtable::Fields {
    value.as_object().cloned().unwrap()
}

/// TC-AT-001: Listing follows the offset token to the last page
#[tokio::test]
async fn tc_at_001_list_follows_pagination() {
    // Given: two pages of records
    let state = MockState::default();
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::none());

    // When: listing the table
    let records = client.list_records().await.unwrap();

    // Then: all three records, second request carried the offset
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec2", "rec3"]);

    let lists = state.requests("GET");
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0]["pageSize"], "100");
    assert_eq!(lists[1]["offset"], "page2");
}

/// TC-AT-002: 429 responses are retried under the policy
#[tokio::test]
async fn tc_at_002_list_retries_rate_limited_requests() {
    let state = MockState::default();
    state.throttle.store(2, Ordering::SeqCst);
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::fast(4));

    let records = client.list_records().await.unwrap();

    assert_eq!(records.len(), 3);
    // 2 throttled + 2 pages
    assert_eq!(state.requests("GET").len(), 4);
}

/// TC-AT-003: Retries stop at max_attempts and surface the status
#[tokio::test]
async fn tc_at_003_exhausted_retries_return_last_status() {
    let state = MockState::default();
    state.throttle.store(10, Ordering::SeqCst);
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::fast(3));

    let err = client.list_records().await.unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(state.requests("GET").len(), 3);
}

/// TC-AT-004: Schema API supplies field types and select choices
#[tokio::test]
async fn tc_at_004_schema_from_meta_api() {
    let state = MockState {
        meta_available: true,
        ..MockState::default()
    };
    let root = spawn_mock(state).await;
    let client = client_for(&root, TOKEN, RetryPolicy::none());

    let schema = client.table_schema().await.unwrap();

    assert_eq!(schema.source, SchemaSource::Meta);
    assert_eq!(schema.fields, vec!["full_name", "profession_cluster"]);
    let choices = schema
        .def("profession_cluster")
        .and_then(|d| d.select_choices())
        .unwrap();
    assert_eq!(choices, vec!["Trades", "Science"]);
}

/// TC-AT-005: Forbidden schema API falls back to sampled record keys
#[tokio::test]
async fn tc_at_005_schema_falls_back_to_sampling() {
    let state = MockState::default();
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::none());

    let schema = client.table_schema().await.unwrap();

    assert_eq!(schema.source, SchemaSource::Sampled);
    assert_eq!(
        schema.fields,
        vec!["full_name", "profession_cluster", "surname"]
    );
    let lists = state.requests("GET");
    assert_eq!(lists[0]["maxRecords"], "5");
}

/// TC-AT-006: Lookup sends an AND formula built from the criteria
#[tokio::test]
async fn tc_at_006_find_first_by_formula() {
    let state = MockState::default();
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::none());

    let found = client
        .find_first(&[("full_name", "Hans Schmidt"), ("profession_canonical", "blacksmith")])
        .await
        .unwrap();
    assert_eq!(found.map(|r| r.id), Some("rec1".to_string()));

    let missing = client
        .find_first(&[("full_name", "Nobody")])
        .await
        .unwrap();
    assert!(missing.is_none());

    let lists = state.requests("GET");
    assert_eq!(
        lists[0]["filterByFormula"],
        r#"AND({full_name} = "Hans Schmidt", {profession_canonical} = "blacksmith")"#
    );
    assert_eq!(lists[0]["maxRecords"], "1");
}

/// TC-AT-007: Creates are split into requests of at most 10 records
#[tokio::test]
async fn tc_at_007_create_records_in_batches_of_ten() {
    let state = MockState::default();
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::none());

    let batch = (0..12)
        .map(|i| fields(json!({"full_name": format!("Person {}", i)})))
        .collect();
    let created = client.create_records(batch).await.unwrap();

    assert_eq!(created, 12);
    let posts = state.requests("POST");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["records"].as_array().unwrap().len(), 10);
    assert_eq!(posts[1]["records"].as_array().unwrap().len(), 2);
}

/// TC-AT-008: Batch patch carries record ids
#[tokio::test]
async fn tc_at_008_patch_records_batch() {
    let state = MockState::default();
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::none());

    let updated = client
        .patch_records(vec![
            ("rec1".to_string(), fields(json!({"np_status": "updated"}))),
            ("rec2".to_string(), fields(json!({"np_status": "updated"}))),
        ])
        .await
        .unwrap();

    assert_eq!(updated, 2);
    let patches = state.requests("PATCH");
    assert_eq!(patches[0]["records"][1]["id"], "rec2");
}

/// TC-AT-009: A rejected single-record patch is not retried
#[tokio::test]
async fn tc_at_009_rejected_patch_surfaces_status() {
    let state = MockState::default();
    let root = spawn_mock(state.clone()).await;
    let client = client_for(&root, TOKEN, RetryPolicy::fast(4));

    client
        .patch_record("rec1", fields(json!({"np_cluster_pred": "Trades"})))
        .await
        .unwrap();
    let err = client
        .patch_record("recBad", fields(json!({"profession_cluster": "Nope"})))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(state.requests("PATCH").len(), 2);
}

/// TC-AT-010: Bearer token is sent on every request
#[tokio::test]
async fn tc_at_010_wrong_token_is_rejected() {
    let state = MockState::default();
    let root = spawn_mock(state).await;
    let client = client_for(&root, "pat-wrong", RetryPolicy::none());

    let err = client.list_records().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
