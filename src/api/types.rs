//! Wire types for the Data API
//!
//! Responses arrive wrapped in a `{ "response": ..., "messages": [...] }`
//! envelope. Only the fields the extractor consumes are modeled.

use crate::types::JsonObject;
use serde::Deserialize;

/// Standard response envelope
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: T,
}

/// Session open response
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub token: String,
}

/// Per-page metadata (`dataInfo`).
///
/// Assumed identical across the pages of one fetch except for the counts;
/// the target table name is nonetheless re-read from every page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Table the records belong to; unknown before the first page arrives
    #[serde(default)]
    pub table: String,
    /// Rows actually returned in this page
    #[serde(default)]
    pub returned_count: u64,
    /// Rows matching the whole fetch
    #[serde(default)]
    pub found_count: u64,
}

/// One record of a page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Field name -> scalar value
    #[serde(default)]
    pub field_data: JsonObject,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub mod_id: Option<String>,
}

impl Record {
    /// A record with no field data carries nothing worth writing or
    /// tracking a watermark from.
    pub fn is_empty(&self) -> bool {
        self.field_data.is_empty()
    }
}

/// One page of records plus its metadata
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<Record>,
    pub info: PageInfo,
}

/// Body of record listing and find responses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsResponse {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub data_info: PageInfo,
}

impl From<RecordsResponse> for Page {
    fn from(response: RecordsResponse) -> Self {
        Self {
            records: response.data,
            info: response.data_info,
        }
    }
}

/// Database listing response body
#[derive(Debug, Deserialize)]
pub struct DatabasesResponse {
    #[serde(default)]
    pub databases: Vec<NamedEntry>,
}

/// A `{ "name": ... }` listing entry
#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    pub name: String,
}

/// Layout listing response body
#[derive(Debug, Deserialize)]
pub struct LayoutsResponse {
    #[serde(default)]
    pub layouts: Vec<LayoutInfo>,
}

/// One layout entry; folders carry their child layouts inline
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub folder_layout_names: Vec<LayoutInfo>,
}

/// Layout field metadata response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadataResponse {
    #[serde(default)]
    pub field_meta_data: Vec<JsonObject>,
}
