//! Column name normalization
//!
//! Source field names may start with an underscore, which the downstream
//! storage layer rejects as a column name. Such names are prefixed with a
//! fixed marker on output; the marker is stripped again when a persisted
//! schema is mapped back to source field names. The two functions are
//! inverses over every name the source side can produce.

/// Marker prepended to column names that start with an underscore.
///
/// `_id` becomes `hsh_id`; `hsh_id` maps back to `_id`.
pub const UNDERSCORE_MARKER: &str = "hsh";

/// Normalize a single source field name into an output column name
pub fn normalize_header(name: &str) -> String {
    if name.starts_with('_') {
        format!("{UNDERSCORE_MARKER}{name}")
    } else {
        name.to_string()
    }
}

/// Map an output column name back to its source field name.
///
/// Only a leading marker directly followed by an underscore is stripped;
/// a field that legitimately contains the marker elsewhere passes through
/// unchanged.
pub fn denormalize_header(name: &str) -> String {
    match name.strip_prefix(UNDERSCORE_MARKER) {
        Some(rest) if rest.starts_with('_') => rest.to_string(),
        _ => name.to_string(),
    }
}

/// Normalize a full column list, preserving order
pub fn normalize_columns(columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| normalize_header(c)).collect()
}

/// Denormalize a full column list, preserving order
pub fn denormalize_columns(columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| denormalize_header(c)).collect()
}
