//! CSV table writer
//!
//! Rows arrive as JSON objects whose key set may widen while a run is in
//! progress, so the final header is not known until the last row has been
//! seen. Rows are spooled to a sidecar JSONL file as they arrive; closing
//! the writer replays the spool into the final CSV with the complete
//! header, padding rows that predate late-arriving columns with empty
//! cells.

use crate::error::{Error, Result};
use crate::types::{value_to_string, JsonObject};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::normalize::normalize_columns;

/// Streaming writer for one output table
#[derive(Debug)]
pub struct CsvTableWriter {
    table: String,
    path: PathBuf,
    spool_path: PathBuf,
    spool: BufWriter<File>,
    /// Source field names in first-seen order
    fieldnames: Vec<String>,
    seen: HashSet<String>,
    rows_written: u64,
}

impl CsvTableWriter {
    /// Open a writer for `table` under `out_dir`.
    ///
    /// `seed_fieldnames` pre-populates the header, typically from a
    /// persisted schema, so a table keeps its columns across runs even
    /// when the current run sees no rows for it.
    pub fn create(out_dir: &Path, table: &str, seed_fieldnames: Vec<String>) -> Result<Self> {
        let path = out_dir.join(format!("{table}.csv"));
        let spool_path = out_dir.join(format!("{table}.csv.part"));
        let file = File::create(&spool_path).map_err(|e| {
            Error::output(format!(
                "Failed to create spool file for table {table}: {e}"
            ))
        })?;

        let seen = seed_fieldnames.iter().cloned().collect();
        Ok(Self {
            table: table.to_string(),
            path,
            spool_path,
            spool: BufWriter::new(file),
            fieldnames: seed_fieldnames,
            seen,
            rows_written: 0,
        })
    }

    /// Table name this writer serves
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Final CSV path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source field names observed so far, in first-seen order
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    /// Rows accepted so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Append one row, widening the header with any new keys
    pub fn write_row(&mut self, row: &JsonObject) -> Result<()> {
        for key in row.keys() {
            if self.seen.insert(key.clone()) {
                self.fieldnames.push(key.clone());
            }
        }

        serde_json::to_writer(&mut self.spool, row)?;
        self.spool.write_all(b"\n").map_err(|e| {
            Error::output(format!("Failed to spool row for table {}: {e}", self.table))
        })?;
        self.rows_written += 1;
        Ok(())
    }

    /// Replay the spool into the final CSV and remove it.
    ///
    /// Returns the complete raw field name list and the row count. A
    /// writer that saw no rows still produces a header-only file.
    pub fn close(mut self) -> Result<(Vec<String>, u64)> {
        self.spool.flush().map_err(|e| {
            Error::output(format!("Failed to flush spool for table {}: {e}", self.table))
        })?;
        drop(self.spool);

        let out = File::create(&self.path).map_err(|e| {
            Error::output(format!("Failed to create {}: {e}", self.path.display()))
        })?;
        let mut out = BufWriter::new(out);

        let header = normalize_columns(&self.fieldnames)
            .iter()
            .map(|c| csv_field(c))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{header}").map_err(|e| {
            Error::output(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        let spool = File::open(&self.spool_path).map_err(|e| {
            Error::output(format!("Failed to reopen spool for table {}: {e}", self.table))
        })?;
        for line in BufReader::new(spool).lines() {
            let line = line.map_err(|e| {
                Error::output(format!("Failed to read spool for table {}: {e}", self.table))
            })?;
            if line.is_empty() {
                continue;
            }
            let row: JsonObject = serde_json::from_str(&line)?;
            let rendered = self
                .fieldnames
                .iter()
                .map(|field| {
                    row.get(field)
                        .map(|v| csv_field(&value_to_string(v)))
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
                .join(",");
            writeln!(out, "{rendered}").map_err(|e| {
                Error::output(format!("Failed to write {}: {e}", self.path.display()))
            })?;
        }

        out.flush().map_err(|e| {
            Error::output(format!("Failed to flush {}: {e}", self.path.display()))
        })?;
        std::fs::remove_file(&self.spool_path).map_err(|e| {
            Error::output(format!("Failed to remove spool for table {}: {e}", self.table))
        })?;

        Ok((self.fieldnames, self.rows_written))
    }
}

/// Quote a CSV field only when it needs quoting
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
