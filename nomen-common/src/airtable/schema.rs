//! Field aliasing
//!
//! Bases in the wild name the same column differently (`full_name`,
//! `Full Name`, `Name`...). Each stage declares the logical fields it needs as
//! [`FieldSpec`]s and resolves them once against the table schema. What to do
//! when no alias matches is explicit per field.

use super::types::{SchemaSource, TableSchema};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Logical field identities used across stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    FullName,
    GivenName,
    Surname,
    Cluster,
    Occupation,
    Language,
    WikidataId,
    Lock,
    Prediction,
    PredictionScore,
    Explanation,
    Status,
    ProfessionPrediction,
    NameRoots,
    NameMeaning,
    NameOrigin,
    EtymologySource,
    EtymologyExplain,
    EtymologyScore,
    EtymologyMatch,
}

/// Behaviour when none of a field's aliases exist in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentPolicy {
    /// Leave the field unmapped; reads yield nothing, writes are skipped
    Skip,
    /// Try a second alias list before giving up
    Fallback(&'static [&'static str]),
    /// Use the first alias verbatim (write target the table is expected to grow)
    Canonical,
    /// Resolution fails with a configuration error
    Required,
}

/// A logical field and its candidate column names
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: FieldKey,
    /// Candidate names in priority order; the first is the canonical name
    pub aliases: &'static [&'static str],
    pub when_absent: AbsentPolicy,
}

impl FieldSpec {
    pub const fn new(
        key: FieldKey,
        aliases: &'static [&'static str],
        when_absent: AbsentPolicy,
    ) -> Self {
        Self {
            key,
            aliases,
            when_absent,
        }
    }
}

/// Resolved logical field → actual column name map for one table
#[derive(Debug, Clone)]
pub struct SchemaMapping {
    columns: BTreeMap<FieldKey, String>,
    schema: TableSchema,
}

impl SchemaMapping {
    pub fn resolve(specs: &[FieldSpec], schema: &TableSchema) -> Result<Self> {
        let mut columns = BTreeMap::new();

        for spec in specs {
            let found = pick_one(&schema.fields, spec.aliases);
            let resolved = match (found, spec.when_absent) {
                (Some(name), _) => Some(name),
                (None, AbsentPolicy::Skip) => None,
                (None, AbsentPolicy::Fallback(alternates)) => pick_one(&schema.fields, alternates),
                (None, AbsentPolicy::Canonical) => spec.aliases.first().map(|s| s.to_string()),
                (None, AbsentPolicy::Required) => {
                    return Err(Error::Config(format!(
                        "No column for {:?}; tried {}",
                        spec.key,
                        spec.aliases.join(", ")
                    )));
                }
            };

            match resolved {
                Some(name) => {
                    debug!(key = ?spec.key, column = %name, "Resolved field");
                    columns.insert(spec.key, name);
                }
                None => debug!(key = ?spec.key, "Field absent, skipping"),
            }
        }

        Ok(Self {
            columns,
            schema: schema.clone(),
        })
    }

    /// Actual column name for `key`, if mapped
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.columns.get(&key).map(String::as_str)
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Value suitable for writing into the column mapped to `key`
    ///
    /// Select columns only accept one of their configured choices; the
    /// canonical spelling is returned for a case-insensitive match and `None`
    /// otherwise. Non-select columns pass the value through. When column types
    /// are unknown (sampled schema) the value is dropped.
    pub fn sanitize_select(&self, key: FieldKey, value: &str) -> Option<String> {
        let column = self.get(key)?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if self.schema.source == SchemaSource::Sampled {
            debug!(column, "Column type unknown, dropping constrained value");
            return None;
        }

        match self.schema.def(column).and_then(|d| d.select_choices()) {
            Some(choices) => normalize_select(value, &choices),
            None => Some(value.to_string()),
        }
    }

    /// Log the resolved mapping
    pub fn log(&self, stage: &str) {
        let pairs: Vec<String> = self
            .columns
            .iter()
            .map(|(k, v)| format!("{:?}={}", k, v))
            .collect();
        info!(stage, fields = %pairs.join(", "), "Field mapping");
    }
}

/// First column matching an alias
///
/// Case-insensitive exact matches win over substring matches; within each
/// pass aliases are tried in priority order.
pub fn pick_one(fields: &[String], aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        let alias = alias.to_lowercase();
        if let Some(f) = fields.iter().find(|f| f.to_lowercase() == alias) {
            return Some(f.clone());
        }
    }

    for alias in aliases {
        let alias = alias.to_lowercase();
        if let Some(f) = fields.iter().find(|f| f.to_lowercase().contains(&alias)) {
            return Some(f.clone());
        }
    }

    None
}

/// Every column whose name contains one of the aliases, in table order
pub fn pick_all(fields: &[String], aliases: &[&str]) -> Vec<String> {
    let aliases: Vec<String> = aliases.iter().map(|a| a.to_lowercase()).collect();
    fields
        .iter()
        .filter(|f| {
            let lower = f.to_lowercase();
            aliases.iter().any(|a| lower.contains(a.as_str()))
        })
        .cloned()
        .collect()
}

/// Canonical spelling of `value` among `choices` (case-insensitive)
pub fn normalize_select(value: &str, choices: &[String]) -> Option<String> {
    let wanted = value.trim().to_lowercase();
    choices
        .iter()
        .find(|c| c.trim().to_lowercase() == wanted)
        .cloned()
}
