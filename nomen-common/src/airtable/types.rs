//! Airtable wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Partial field map sent with create/patch requests
pub type Fields = serde_json::Map<String, Value>;

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Airtable record id (`rec...`)
    pub id: String,
    /// Only non-empty cells are returned by Airtable
    #[serde(default)]
    pub fields: Fields,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
            created_time: None,
        }
    }

    /// Cell value as trimmed text; numbers are formatted, anything else is empty
    pub fn text(&self, field: Option<&str>) -> String {
        match field.and_then(|name| self.fields.get(name)) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Whether the cell is present and truthy (see [`truthy`])
    pub fn flag(&self, field: Option<&str>) -> bool {
        field
            .and_then(|name| self.fields.get(name))
            .map(truthy)
            .unwrap_or(false)
    }
}

/// Checkbox/text flag interpretation
///
/// Booleans as-is, numbers when non-zero, text when one of
/// `1`, `true`, `yes`, `y`, `checked` (case-insensitive).
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "checked"
        ),
        _ => false,
    }
}

/// `GET /v0/{base}/{table}` page
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub records: Vec<Record>,
    /// Opaque continuation token; absent on the last page
    pub offset: Option<String>,
}

/// `POST`/`PATCH` batch response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BatchResponse {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// `GET /v0/meta/bases/{base}/tables`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MetaResponse {
    #[serde(default)]
    pub tables: Vec<TableMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TableMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Field definition from the schema API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub options: Option<FieldOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(default)]
    pub choices: Vec<SelectChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectChoice {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

impl FieldDef {
    pub fn is_select(&self) -> bool {
        matches!(self.field_type.as_str(), "singleSelect" | "multipleSelects")
    }

    /// Allowed option names for select fields
    pub fn select_choices(&self) -> Option<Vec<String>> {
        if !self.is_select() {
            return None;
        }
        Some(
            self.options
                .as_ref()
                .map(|o| o.choices.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default(),
        )
    }
}

/// Where the field list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// Schema API (authoritative, includes types and select choices)
    Meta,
    /// Union of keys observed in a few records (no types)
    Sampled,
}

/// Table field names plus definitions when the schema API was available
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub fields: Vec<String>,
    pub defs: BTreeMap<String, FieldDef>,
    pub source: SchemaSource,
}

impl TableSchema {
    pub fn from_defs(defs: Vec<FieldDef>) -> Self {
        let fields = defs.iter().map(|d| d.name.clone()).collect();
        let defs = defs.into_iter().map(|d| (d.name.clone(), d)).collect();
        Self {
            fields,
            defs,
            source: SchemaSource::Meta,
        }
    }

    /// Sorted union of field keys seen in `records`
    pub fn sampled(records: &[Record]) -> Self {
        let names: BTreeSet<String> = records
            .iter()
            .flat_map(|r| r.fields.keys().cloned())
            .collect();
        Self {
            fields: names.into_iter().collect(),
            defs: BTreeMap::new(),
            source: SchemaSource::Sampled,
        }
    }

    pub fn def(&self, field: &str) -> Option<&FieldDef> {
        self.defs.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        Record::new("rec1", fields.as_object().cloned().unwrap())
    }

    #[test]
    fn test_truthy_variants() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("Checked")));
        assert!(truthy(&json!(" yes ")));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("no")));
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(["true"])));
    }

    #[test]
    fn test_record_text() {
        let rec = record(json!({"full_name": "  Hans Schmidt ", "score": 1.5, "tags": ["a"]}));
        assert_eq!(rec.text(Some("full_name")), "Hans Schmidt");
        assert_eq!(rec.text(Some("score")), "1.5");
        assert_eq!(rec.text(Some("tags")), "");
        assert_eq!(rec.text(Some("missing")), "");
        assert_eq!(rec.text(None), "");
    }

    #[test]
    fn test_record_deserializes_without_fields() {
        let rec: Record = serde_json::from_value(json!({"id": "rec9"})).unwrap();
        assert!(rec.fields.is_empty());
    }

    #[test]
    fn test_sampled_schema_is_sorted_union() {
        let records = vec![
            record(json!({"surname": "Curie", "full_name": "Marie Curie"})),
            record(json!({"full_name": "Otto Müller", "cluster": "Trades"})),
        ];
        let schema = TableSchema::sampled(&records);
        assert_eq!(schema.fields, vec!["cluster", "full_name", "surname"]);
        assert_eq!(schema.source, SchemaSource::Sampled);
        assert!(schema.defs.is_empty());
    }

    #[test]
    fn test_select_choices() {
        let def: FieldDef = serde_json::from_value(json!({
            "id": "fld1",
            "name": "profession_cluster",
            "type": "singleSelect",
            "options": {"choices": [{"id": "sel1", "name": "Trades"}, {"name": "Science"}]}
        }))
        .unwrap();
        assert_eq!(def.select_choices().unwrap(), vec!["Trades", "Science"]);

        let text: FieldDef =
            serde_json::from_value(json!({"name": "full_name", "type": "singleLineText"})).unwrap();
        assert!(text.select_choices().is_none());
    }
}
