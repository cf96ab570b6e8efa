//! Airtable REST client
//!
//! Rate limited to the per-base quota and retried under the shared
//! [`RetryPolicy`]. Table ids and names are path-encoded, so tables named
//! with spaces or unicode work.

use super::store::RecordStore;
use super::types::{BatchResponse, Fields, ListResponse, MetaResponse, Record, TableSchema};
use super::{MAX_BATCH, PAGE_SIZE};
use crate::config::{get_user_agent, AirtableConfig, AirtableSettings};
use crate::http::{build_client, rate_limiter, send_with_retry, DirectRateLimiter};
use crate::{Error, Result, RetryPolicy};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Safety stop for runaway pagination
const MAX_PAGES: usize = 1000;

/// Records fetched when falling back from the schema API
const SCHEMA_SAMPLE_SIZE: usize = 5;

/// Airtable REST API client for one table
pub struct AirtableClient {
    http: reqwest::Client,
    config: AirtableConfig,
    policy: RetryPolicy,
    limiter: DirectRateLimiter,
}

impl AirtableClient {
    pub fn new(
        config: AirtableConfig,
        settings: &AirtableSettings,
        policy: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            http: build_client(&get_user_agent())?,
            config,
            policy,
            limiter: rate_limiter(settings.requests_per_second),
        })
    }

    pub fn config(&self) -> &AirtableConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_root).map_err(|e| {
            Error::Config(format!(
                "Invalid Airtable API root {}: {}",
                self.config.api_root, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::Config(format!(
                    "Airtable API root cannot carry a path: {}",
                    self.config.api_root
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn table_url(&self) -> Result<Url> {
        self.url(&[self.config.base_id.as_str(), self.config.table.as_str()])
    }

    fn record_url(&self, id: &str) -> Result<Url> {
        self.url(&[self.config.base_id.as_str(), self.config.table.as_str(), id])
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = send_with_retry(&self.policy, &self.limiter, operation, || {
            self.http
                .get(url.clone())
                .bearer_auth(&self.config.token)
                .query(query)
        })
        .await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: &Value,
    ) -> Result<T> {
        let response = send_with_retry(&self.policy, &self.limiter, operation, || {
            self.http
                .request(method.clone(), url.clone())
                .bearer_auth(&self.config.token)
                .json(body)
        })
        .await?;
        Ok(response.json::<T>().await?)
    }

    /// Field definitions from the schema API, `None` when the table is not listed
    async fn meta_schema(&self) -> Result<Option<TableSchema>> {
        let url = self.url(&["meta", "bases", self.config.base_id.as_str(), "tables"])?;
        let meta: MetaResponse = self.get_json("fetch table schema", url, &[]).await?;

        Ok(meta
            .tables
            .into_iter()
            .find(|t| t.id == self.config.table || t.name == self.config.table)
            .map(|t| TableSchema::from_defs(t.fields)))
    }

    async fn sampled_schema(&self) -> Result<TableSchema> {
        let page: ListResponse = self
            .get_json(
                "sample records",
                self.table_url()?,
                &[("maxRecords", SCHEMA_SAMPLE_SIZE.to_string())],
            )
            .await?;
        Ok(TableSchema::sampled(&page.records))
    }
}

/// `filterByFormula` expression matching every `(field, value)` pair exactly
pub fn equality_formula(criteria: &[(&str, &str)]) -> String {
    let clauses: Vec<String> = criteria
        .iter()
        .map(|(field, value)| format!("{{{}}} = \"{}\"", field, escape_formula(value.trim())))
        .collect();

    match clauses.len() {
        1 => clauses[0].clone(),
        _ => format!("AND({})", clauses.join(", ")),
    }
}

fn escape_formula(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn table_schema(&self) -> Result<TableSchema> {
        match self.meta_schema().await {
            Ok(Some(schema)) => {
                debug!(fields = schema.fields.len(), "Schema from meta API");
                Ok(schema)
            }
            Ok(None) => {
                warn!(table = %self.config.table, "Table not listed by schema API, sampling records");
                self.sampled_schema().await
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "Schema API unavailable, sampling records");
                self.sampled_schema().await
            }
        }
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        let url = self.table_url()?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &offset {
                query.push(("offset", token.clone()));
            }

            let response: ListResponse = self.get_json("list records", url.clone(), &query).await?;
            debug!(page, count = response.records.len(), "Fetched page");
            records.extend(response.records);

            match response.offset {
                Some(next) => offset = Some(next),
                None => {
                    info!(records = records.len(), table = %self.config.table, "Listed records");
                    return Ok(records);
                }
            }
        }

        warn!(
            max_pages = MAX_PAGES,
            records = records.len(),
            "Pagination limit reached, returning partial listing"
        );
        Ok(records)
    }

    async fn find_first(&self, criteria: &[(&str, &str)]) -> Result<Option<Record>> {
        let query = [
            ("filterByFormula", equality_formula(criteria)),
            ("maxRecords", "1".to_string()),
        ];
        let page: ListResponse = self
            .get_json("find record", self.table_url()?, &query)
            .await?;
        Ok(page.records.into_iter().next())
    }

    async fn patch_record(&self, id: &str, fields: Fields) -> Result<()> {
        let body = json!({ "fields": fields });
        let _updated: Record = self
            .send_json("patch record", Method::PATCH, self.record_url(id)?, &body)
            .await?;
        Ok(())
    }

    async fn patch_records(&self, updates: Vec<(String, Fields)>) -> Result<usize> {
        let url = self.table_url()?;
        let mut total = 0;

        for chunk in updates.chunks(MAX_BATCH) {
            let records: Vec<Value> = chunk
                .iter()
                .map(|(id, fields)| json!({ "id": id, "fields": fields }))
                .collect();
            let body = json!({ "records": records });
            let response: BatchResponse = self
                .send_json("patch records", Method::PATCH, url.clone(), &body)
                .await?;
            total += response.records.len();
        }

        Ok(total)
    }

    async fn create_records(&self, new_records: Vec<Fields>) -> Result<usize> {
        let url = self.table_url()?;
        let mut total = 0;

        for chunk in new_records.chunks(MAX_BATCH) {
            let records: Vec<Value> = chunk.iter().map(|f| json!({ "fields": f })).collect();
            let body = json!({ "records": records });
            let response: BatchResponse = self
                .send_json("create records", Method::POST, url.clone(), &body)
                .await?;
            total += response.records.len();
        }

        Ok(total)
    }
}
