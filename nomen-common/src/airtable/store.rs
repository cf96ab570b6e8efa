//! Record store seam
//!
//! Services are written against [`RecordStore`] so a run can target the REST
//! API ([`super::AirtableClient`]) or an in-memory table ([`MemoryStore`]).

use super::types::{Fields, Record, TableSchema};
use super::MAX_BATCH;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Table operations used by the pipeline stages
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Field names (and definitions when available)
    async fn table_schema(&self) -> Result<TableSchema>;

    /// Every record, following pagination to the end
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// First record whose fields equal all `(field, value)` pairs
    async fn find_first(&self, criteria: &[(&str, &str)]) -> Result<Option<Record>>;

    async fn patch_record(&self, id: &str, fields: Fields) -> Result<()>;

    /// Patch up to [`MAX_BATCH`] records in one request
    async fn patch_records(&self, updates: Vec<(String, Fields)>) -> Result<usize>;

    /// Create up to [`MAX_BATCH`] records in one request
    async fn create_records(&self, records: Vec<Fields>) -> Result<usize>;
}

/// In-memory table with optional injected failures
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
    schema: Option<TableSchema>,
    failing_ids: BTreeSet<String>,
    fail_batches: bool,
    next_id: AtomicUsize,
    write_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            next_id: AtomicUsize::new(records.len() + 1),
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Report `schema` instead of sampling record keys
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Single-record patches of `id` fail with HTTP 422
    pub fn failing_record(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    /// Every batch create/patch fails with HTTP 422
    pub fn failing_batches(mut self) -> Self {
        self.fail_batches = true;
        self
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn record(&self, id: &str) -> Option<Record> {
        self.lock().iter().find(|r| r.id == id).cloned()
    }

    /// Number of write requests received (single or batch)
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn rejected(operation: &str, status: u16, body: &str) -> Error {
        Error::Http {
            operation: operation.to_string(),
            status,
            body: body.to_string(),
        }
    }

    fn check_batch(&self, operation: &str, len: usize) -> Result<()> {
        if len > MAX_BATCH {
            return Err(Self::rejected(operation, 422, "INVALID_RECORDS: too many records"));
        }
        if self.fail_batches {
            return Err(Self::rejected(operation, 422, "INVALID_VALUE_FOR_COLUMN"));
        }
        Ok(())
    }

    fn merge(records: &mut [Record], id: &str, fields: Fields) -> Result<()> {
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Self::rejected("patch record", 404, "NOT_FOUND"))?;
        for (name, value) in fields {
            record.fields.insert(name, value);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn table_schema(&self) -> Result<TableSchema> {
        match &self.schema {
            Some(schema) => Ok(schema.clone()),
            None => {
                let records = self.lock();
                let sample = &records[..records.len().min(5)];
                Ok(TableSchema::sampled(sample))
            }
        }
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        Ok(self.records())
    }

    async fn find_first(&self, criteria: &[(&str, &str)]) -> Result<Option<Record>> {
        Ok(self
            .lock()
            .iter()
            .find(|r| {
                criteria
                    .iter()
                    .all(|&(field, value)| r.text(Some(field)) == value.trim())
            })
            .cloned())
    }

    async fn patch_record(&self, id: &str, fields: Fields) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(id) {
            return Err(Self::rejected("patch record", 422, "INVALID_VALUE_FOR_COLUMN"));
        }
        Self::merge(&mut self.lock(), id, fields)
    }

    async fn patch_records(&self, updates: Vec<(String, Fields)>) -> Result<usize> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_batch("patch records", updates.len())?;

        let mut records = self.lock();
        let count = updates.len();
        for (id, fields) in updates {
            Self::merge(&mut records, &id, fields)?;
        }
        Ok(count)
    }

    async fn create_records(&self, new_records: Vec<Fields>) -> Result<usize> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_batch("create records", new_records.len())?;

        let mut records = self.lock();
        let count = new_records.len();
        for fields in new_records {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            records.push(Record::new(format!("rec{:05}", n), fields));
        }
        Ok(count)
    }
}
