//! Writer cache
//!
//! One [`CsvTableWriter`] per distinct table name for the lifetime of a
//! run, created lazily on first use. Pages carrying the same table name
//! share a writer regardless of arrival order; finalizing closes every
//! writer, emits its manifest and reports the normalized schema to
//! persist for the next run.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::normalize::{denormalize_columns, normalize_columns};
use super::writer::CsvTableWriter;

/// Sidecar manifest written next to each CSV file
#[derive(Debug, Clone, Serialize)]
pub struct TableManifest {
    /// Normalized column names, header order
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    pub incremental: bool,
}

/// Result of closing one table's writer
#[derive(Debug, Clone)]
pub struct FinalizedTable {
    pub name: String,
    pub path: PathBuf,
    /// Normalized column names, header order
    pub columns: Vec<String>,
    pub rows_written: u64,
}

struct Entry {
    writer: CsvTableWriter,
    primary_key: Vec<String>,
    incremental: bool,
}

/// Lazily-created writers keyed by table name
pub struct WriterCache {
    out_dir: PathBuf,
    entries: HashMap<String, Entry>,
    /// Creation order, for deterministic finalization
    order: Vec<String>,
}

impl WriterCache {
    /// Create a cache writing under `out_dir`, creating the directory if
    /// needed
    pub fn new(out_dir: impl AsRef<Path>) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir).map_err(|e| {
            Error::output(format!(
                "Failed to create output directory {}: {e}",
                out_dir.display()
            ))
        })?;
        Ok(Self {
            out_dir,
            entries: HashMap::new(),
            order: Vec::new(),
        })
    }

    /// Number of distinct tables seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no table has been opened yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writer for `table`, creating it on first use.
    ///
    /// `persisted_schema` carries the normalized columns stored by a
    /// previous run; they are denormalized back into source field names
    /// to seed the new writer's header.
    pub fn get_or_create(
        &mut self,
        table: &str,
        persisted_schema: Option<&[String]>,
        primary_key: &[String],
        incremental: bool,
    ) -> Result<&mut CsvTableWriter> {
        let entry = match self.entries.entry(table.to_string()) {
            MapEntry::Occupied(entry) => entry.into_mut(),
            MapEntry::Vacant(slot) => {
                let seed = persisted_schema
                    .map(denormalize_columns)
                    .unwrap_or_default();
                debug!(
                    "Opening writer for table {table} ({} seeded columns)",
                    seed.len()
                );
                let writer = CsvTableWriter::create(&self.out_dir, table, seed)?;
                self.order.push(table.to_string());
                slot.insert(Entry {
                    writer,
                    primary_key: primary_key.to_vec(),
                    incremental,
                })
            }
        };
        Ok(&mut entry.writer)
    }

    /// Close every writer, write manifests and report final schemas
    pub fn finalize(mut self) -> Result<Vec<FinalizedTable>> {
        let mut finalized = Vec::with_capacity(self.order.len());
        for table in self.order {
            let Some(entry) = self.entries.remove(&table) else {
                continue;
            };
            let path = entry.writer.path().to_path_buf();
            let (fieldnames, rows_written) = entry.writer.close()?;
            let columns = normalize_columns(&fieldnames);

            let manifest = TableManifest {
                columns: columns.clone(),
                primary_key: normalize_columns(&entry.primary_key),
                incremental: entry.incremental,
            };
            let manifest_path = self.out_dir.join(format!("{table}.csv.manifest"));
            let contents = serde_json::to_string_pretty(&manifest)?;
            fs::write(&manifest_path, contents).map_err(|e| {
                Error::output(format!(
                    "Failed to write manifest {}: {e}",
                    manifest_path.display()
                ))
            })?;

            info!("Finalized table {table}: {rows_written} rows, {} columns", columns.len());
            finalized.push(FinalizedTable {
                name: table,
                path,
                columns,
                rows_written,
            });
        }
        Ok(finalized)
    }
}
