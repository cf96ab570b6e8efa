//! Airtable record store
//!
//! The pipeline treats one Airtable table as a shared data bus: stages read
//! every record, compute, and patch their own output fields back.
//!
//! - [`types`]: wire types (records, field definitions, table schema)
//! - [`schema`]: field aliasing resolved once into a typed [`SchemaMapping`]
//! - [`store`]: the [`RecordStore`] seam plus an in-memory implementation
//! - [`client`]: REST implementation against `api.airtable.com`

pub mod client;
pub mod schema;
pub mod store;
pub mod types;

pub use client::AirtableClient;
pub use schema::{AbsentPolicy, FieldKey, FieldSpec, SchemaMapping};
pub use store::{MemoryStore, RecordStore};
pub use types::{Fields, Record, SchemaSource, TableSchema};

/// Airtable accepts at most 10 records per create/update request
pub const MAX_BATCH: usize = 10;

/// Airtable list endpoint page size ceiling
pub const PAGE_SIZE: usize = 100;
