//! Incremental watermark tracking
//!
//! Bounds each run's fetch to records at or past the values last seen by
//! the previous run, and records the new high-water values once a fetch
//! completes. Values are read from and written to the persisted run
//! state; a run that fails mid-fetch never updates them.

use crate::config::LoadingOptions;
use crate::query::SortSpec;
use crate::state::RunState;
use crate::types::{value_to_string, JsonObject, QueryGroup};
use std::collections::HashMap;
use tracing::debug;

/// Tracks watermark values for one layout across a run
#[derive(Debug)]
pub struct WatermarkTracker {
    layout: String,
    /// Configured watermark fields, in configuration order
    fields: Vec<String>,
    /// Whether watermark filtering is applied to the query
    incremental_fetch: bool,
    /// Current values, seeded from the previous run's persisted state
    values: HashMap<String, String>,
}

impl WatermarkTracker {
    /// Build a tracker from configuration and persisted state
    pub fn from_state(layout: &str, options: &LoadingOptions, state: &RunState) -> Self {
        let values = state.watermarks(layout).cloned().unwrap_or_default();
        Self {
            layout: layout.to_string(),
            fields: options.incremental_fields.clone(),
            incremental_fetch: options.incremental_fetch,
            values,
        }
    }

    /// Configured watermark fields
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether any configured field has a prior value
    pub fn has_prior_values(&self) -> bool {
        self.fields.iter().any(|f| self.values.contains_key(f))
    }

    /// Append the watermark filter group to a query.
    ///
    /// One additional group is added containing `field >= prior` for every
    /// configured field with a known prior value. Fields within the group
    /// AND-combine; the group itself OR-combines with all configured filter
    /// groups. The union semantics (rather than intersecting with user
    /// filters) must hold exactly.
    pub fn augment_query(&self, query: &mut Vec<QueryGroup>) {
        if !self.incremental_fetch || !self.has_prior_values() {
            return;
        }

        let mut group = QueryGroup::new();
        for field in &self.fields {
            if let Some(prior) = self.values.get(field) {
                group.insert(field.clone(), format!(">= {prior}"));
            }
        }
        debug!(
            "Applying incremental filter for layout {}: {:?}",
            self.layout, group
        );
        query.push(group);
    }

    /// Ascending sort over exactly the watermark fields.
    ///
    /// Keeps the stream monotonically increasing in watermark order, which
    /// is what makes the last-row update in [`Self::update_from_row`]
    /// correct.
    pub fn sort_spec(&self) -> Vec<SortSpec> {
        self.fields
            .iter()
            .map(|f| SortSpec::ascending(f))
            .collect()
    }

    /// Update watermark values from the last non-empty row of a completed
    /// fetch.
    ///
    /// Correct only because the fetch was sorted ascending on the watermark
    /// fields (see [`Self::sort_spec`]): the last row written then carries
    /// the highest values. Disabling the sort while incremental fetching is
    /// enabled would let the watermark silently regress.
    pub fn update_from_row(&mut self, row: &JsonObject) {
        for field in &self.fields {
            match row.get(field) {
                Some(value) if !value.is_null() => {
                    let rendered = value_to_string(value);
                    debug!(
                        "Watermark for {}.{} advanced to {rendered}",
                        self.layout, field
                    );
                    self.values.insert(field.clone(), rendered);
                }
                _ => {}
            }
        }
    }

    /// Write the current values back into the run state
    pub fn persist(&self, state: &mut RunState) {
        if self.fields.is_empty() {
            return;
        }
        state.set_watermarks(&self.layout, self.values.clone());
    }
}
