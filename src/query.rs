//! Find-request bodies
//!
//! Wire shapes for the `_find` endpoint: an OR-list of AND-groups plus an
//! optional sort specification. Groups are built fresh per run from
//! configuration and watermark augmentation.

use crate::types::QueryGroup;
use serde::Serialize;

/// Sort direction understood by the find endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
}

/// One sort instruction of a find request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field_name: String,
    pub sort_order: SortOrder,
}

impl SortSpec {
    /// Ascending sort on a field
    pub fn ascending(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            sort_order: SortOrder::Ascend,
        }
    }
}

/// Request body for one page of a filtered find
#[derive(Debug, Clone, Serialize)]
pub struct FindRequest {
    /// Filter groups; each group OR-combines with the others, fields within
    /// a group AND-combine
    pub query: Vec<QueryGroup>,
    /// Sort instructions, omitted from the body when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
    /// 1-based record offset
    pub offset: u32,
    /// Page size
    pub limit: u32,
}
