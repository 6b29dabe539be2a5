//! Common types used throughout the extractor
//!
//! Shared type definitions and small conversion helpers used across
//! multiple modules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type. Insertion order is preserved so output column order
/// follows the order fields arrive from the API.
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One find-query group: field name -> criteria expression.
/// Fields within a group AND-combine; groups OR-combine with each other.
pub type QueryGroup = std::collections::BTreeMap<String, String>;

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for transport retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Scalar rendering
// ============================================================================

/// Render a JSON value as a flat cell/watermark string.
///
/// Scalars render naturally, null renders empty, and nested containers
/// fall back to compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
