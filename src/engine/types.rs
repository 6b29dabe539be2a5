//! Run-level accounting

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// API pages fetched (every endpoint call that returned rows counts)
    pub pages: u64,
    /// Rows written across all tables
    pub rows: u64,
    /// Distinct output tables finalized
    pub tables: u64,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows across {} tables in {} pages ({} ms)",
            self.rows, self.tables, self.pages, self.duration_ms
        )
    }
}
