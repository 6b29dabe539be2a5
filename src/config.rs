//! Extractor configuration
//!
//! Typed view of the JSON configuration file, plus validation that runs
//! before any network call. Validation failures are user-facing
//! configuration errors.

use crate::error::{Error, Result};
use crate::types::QueryGroup;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extraction mode selector.
///
/// Modes share the run contract (authenticate, fetch, finalize, logout)
/// over disjoint input/output shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Fetch records of a single configured layout
    #[default]
    Layout,
    /// Enumerate databases, layouts and field metadata
    Metadata,
}

/// Top-level extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server base URL, e.g. `https://fms.example.com`
    pub base_url: String,

    /// Database name the session is scoped to
    pub database: String,

    /// Account name for the Basic-auth session handshake
    pub username: String,

    /// Account password
    #[serde(rename = "#password", alias = "password")]
    pub password: String,

    /// What to extract
    #[serde(default)]
    pub mode: ExtractMode,

    /// Layout to fetch in [`ExtractMode::Layout`]
    #[serde(default)]
    pub layout_name: Option<String>,

    /// Configured find filter groups
    #[serde(default)]
    pub query: Vec<Vec<QueryFilter>>,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Verify TLS certificates (disable only for self-signed servers)
    #[serde(default = "default_true")]
    pub ssl_verify: bool,

    /// Output loading options
    #[serde(default)]
    pub loading_options: LoadingOptions,

    /// (database, layout) pairs to fetch field metadata for in
    /// [`ExtractMode::Metadata`]
    #[serde(default)]
    pub metadata_layouts: Vec<MetadataLayout>,
}

/// A single configured filter criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Field the criterion applies to
    pub field_name: String,
    /// Criteria expression, e.g. `>= 01/01/2020` or `= Jane`
    pub find_criteria: String,
}

/// Options controlling how output tables are loaded downstream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadingOptions {
    /// Load output tables incrementally (append) rather than full replace
    #[serde(default)]
    pub incremental: bool,

    /// Enable watermark-bounded fetching across runs
    #[serde(default)]
    pub incremental_fetch: bool,

    /// Watermark fields tracked for incremental fetching
    #[serde(default)]
    pub incremental_fields: Vec<String>,

    /// Primary key columns (original, pre-normalization names)
    #[serde(default)]
    pub pkey: Vec<String>,
}

/// One (database, layout) pair of the metadata allow-list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataLayout {
    pub database: String,
    pub layout: String,
}

fn default_page_size() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration before any network call
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)?;
        if self.database.is_empty() {
            return Err(Error::missing_field("database"));
        }
        if self.username.is_empty() {
            return Err(Error::missing_field("username"));
        }
        if self.password.is_empty() {
            return Err(Error::missing_field("#password"));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than zero"));
        }

        match self.mode {
            ExtractMode::Layout => {
                if self.layout_name.as_deref().unwrap_or("").is_empty() {
                    return Err(Error::missing_field("layout_name"));
                }
            }
            ExtractMode::Metadata => {}
        }

        let opts = &self.loading_options;
        if opts.incremental_fetch && opts.incremental_fields.is_empty() {
            return Err(Error::config(
                "incremental_fetch requires at least one entry in incremental_fields",
            ));
        }

        Ok(())
    }

    /// Layout name for layout mode; validated to be present beforehand
    pub fn layout(&self) -> &str {
        self.layout_name.as_deref().unwrap_or("")
    }

    /// Build the find-query groups from the configured filters
    pub fn query_groups(&self) -> Vec<QueryGroup> {
        self.query
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|f| (f.field_name.clone(), f.find_criteria.clone()))
                    .collect()
            })
            .collect()
    }
}
