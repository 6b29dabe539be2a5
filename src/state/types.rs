//! State types persisted between runs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Complete persisted state of the extractor.
///
/// Serialized as `{ "table_schemas": {...}, "previous_run_values": {...} }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// Table name -> ordered normalized column names. Keeps a table's
    /// header stable even when a run observes zero rows for it.
    #[serde(default, deserialize_with = "lenient_map")]
    pub table_schemas: HashMap<String, Vec<String>>,

    /// Layout name -> watermark field -> last-seen value
    #[serde(default, deserialize_with = "lenient_map")]
    pub previous_run_values: HashMap<String, HashMap<String, String>>,
}

impl RunState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted schema for a table, if any
    pub fn schema(&self, table: &str) -> Option<&Vec<String>> {
        self.table_schemas.get(table)
    }

    /// Replace the persisted schema for a table
    pub fn set_schema(&mut self, table: &str, columns: Vec<String>) {
        self.table_schemas.insert(table.to_string(), columns);
    }

    /// Watermark values persisted for a layout
    pub fn watermarks(&self, layout: &str) -> Option<&HashMap<String, String>> {
        self.previous_run_values.get(layout)
    }

    /// Replace the watermark values for a layout
    pub fn set_watermarks(&mut self, layout: &str, values: HashMap<String, String>) {
        self.previous_run_values.insert(layout.to_string(), values);
    }
}

/// The host platform occasionally serializes an empty mapping as an empty
/// sequence. Normalize that shape drift (and any other non-mapping
/// container, outer or nested) into a canonical empty map at load time
/// instead of propagating it as an error.
fn lenient_map<'de, D, V>(deserializer: D) -> Result<HashMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(map) = value else {
        return Ok(HashMap::new());
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| (key, serde_json::from_value(value).unwrap_or_default()))
        .collect())
}
