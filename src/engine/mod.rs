//! Extraction engine
//!
//! Orchestrates one run end to end: validate configuration, open a
//! session, page through the source, stream rows into per-table writers,
//! then finalize outputs and state. The session is closed on every path
//! out of the fetch, success or failure; when both the fetch and the
//! logout fail, the fetch error is the one reported.
//!
//! Everything is sequential: one session, one in-flight request, pages
//! processed in arrival order. Watermark correctness depends on it.

mod types;

pub use types::RunStats;

use crate::api::{DataApiClient, LayoutInfo, RecordPager};
use crate::config::{Config, ExtractMode, LoadingOptions, MetadataLayout};
use crate::error::Result;
use crate::output::{CsvTableWriter, WriterCache};
use crate::state::StateManager;
use crate::types::{JsonObject, JsonValue, QueryGroup};
use crate::watermark::WatermarkTracker;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;


/// Output table of database names in metadata mode
const DATABASES_TABLE: &str = "databases";
/// Output table of layout names in metadata mode
const LAYOUTS_TABLE: &str = "layouts";
/// Output table of field metadata in metadata mode
const FIELDS_TABLE: &str = "fields";

/// One-run extraction orchestrator
pub struct Engine {
    config: Config,
    client: DataApiClient,
    state: StateManager,
    out_dir: PathBuf,
}

impl Engine {
    /// Assemble an engine from its parts
    pub fn new(
        config: Config,
        client: DataApiClient,
        state: StateManager,
        out_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            config,
            client,
            state,
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    /// State manager backing this engine
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Execute one full run in the configured mode
    pub async fn run(&mut self) -> Result<RunStats> {
        self.config.validate()?;
        let started = Instant::now();

        let mut stats = match self.config.mode {
            ExtractMode::Layout => self.run_layout().await?,
            ExtractMode::Metadata => self.run_metadata().await?,
        };
        self.state.save().await?;

        stats.duration_ms = started.elapsed().as_millis() as u64;
        info!("Run finished: {stats}");
        Ok(stats)
    }

    /// Verify connectivity and credentials with a login/logout round trip
    pub async fn check(&mut self) -> Result<()> {
        self.config.validate()?;
        let database = self.config.database.clone();
        let username = self.config.username.clone();
        let password = self.config.password.clone();

        self.client.login(&database, &username, &password).await?;
        self.client.logout().await?;
        info!("Connection check passed for database {database}");
        Ok(())
    }

    // ========================================================================
    // Layout mode
    // ========================================================================

    async fn run_layout(&mut self) -> Result<RunStats> {
        let database = self.config.database.clone();
        let username = self.config.username.clone();
        let password = self.config.password.clone();
        let layout = self.config.layout().to_string();

        let mut tracker =
            WatermarkTracker::from_state(&layout, &self.config.loading_options, self.state.state());
        let mut query = self.config.query_groups();
        tracker.augment_query(&mut query);

        info!("Extracting layout {layout} of database {database}");
        self.client.login(&database, &username, &password).await?;
        let work = self.fetch_layout(&database, &layout, query, &mut tracker).await;
        let logout = self.client.logout().await;
        let stats = work?;
        logout?;
        Ok(stats)
    }

    /// Page through one layout into the writer cache.
    ///
    /// An empty query selects the unfiltered listing endpoint; any filter
    /// group (configured or watermark-derived) switches to the find
    /// endpoint, sorted ascending on the watermark fields.
    async fn fetch_layout(
        &mut self,
        database: &str,
        layout: &str,
        query: Vec<QueryGroup>,
        tracker: &mut WatermarkTracker,
    ) -> Result<RunStats> {
        let opts = self.config.loading_options.clone();
        let mut cache = WriterCache::new(&self.out_dir)?;
        let mut stats = RunStats::default();

        let mut pager = if query.is_empty() {
            RecordPager::list(&self.client, database, layout, self.config.page_size)
        } else {
            RecordPager::find(
                &self.client,
                database,
                layout,
                query,
                tracker.sort_spec(),
                self.config.page_size,
            )
        };

        let mut last_row: Option<JsonObject> = None;
        let mut last_table: Option<String> = None;
        while let Some(page) = pager.next_page().await? {
            stats.pages += 1;
            if stats.pages == 1 {
                info!("Found {} records in layout {layout}", page.info.found_count);
            }

            // Routed by the table the server names, not the layout. A page
            // that omits the name stays with the fetch's last-seen table so
            // one fetch cannot split across two writers.
            if !page.info.table.is_empty() {
                last_table = Some(page.info.table.clone());
            }
            let table = last_table.clone().unwrap_or_else(|| layout.to_string());
            let writer = cache.get_or_create(
                &table,
                self.state.state().schema(&table).map(Vec::as_slice),
                &opts.pkey,
                opts.incremental,
            )?;

            for record in &page.records {
                if record.is_empty() {
                    continue;
                }
                writer.write_row(&record.field_data)?;
                stats.rows += 1;
            }
            if let Some(record) = page.records.iter().rev().find(|r| !r.is_empty()) {
                last_row = Some(record.field_data.clone());
            }
        }

        // Only a fully completed fetch advances the watermark; an error
        // above leaves the previous run's values authoritative.
        if let Some(row) = &last_row {
            tracker.update_from_row(row);
        }

        stats.tables = self.finalize(cache)?;
        tracker.persist(self.state.state_mut());
        Ok(stats)
    }

    // ========================================================================
    // Metadata mode
    // ========================================================================

    async fn run_metadata(&mut self) -> Result<RunStats> {
        let username = self.config.username.clone();
        let password = self.config.password.clone();
        let opts = self.config.loading_options.clone();
        let pairs = self.config.metadata_layouts.clone();

        let mut cache = WriterCache::new(&self.out_dir)?;
        let mut stats = RunStats::default();

        // Database discovery runs on Basic auth, outside any session.
        let databases = self.client.list_databases(&username, &password).await?;
        info!("Discovered {} databases", databases.len());
        stats.pages += 1;
        let writer = cache.get_or_create(
            DATABASES_TABLE,
            self.state.state().schema(DATABASES_TABLE).map(Vec::as_slice),
            &[],
            opts.incremental,
        )?;
        for name in &databases {
            let mut row = JsonObject::new();
            row.insert("name".to_string(), JsonValue::String(name.clone()));
            writer.write_row(&row)?;
            stats.rows += 1;
        }

        // Layouts are enumerated for every discovered database; each
        // session-backed sub-call gets its own scoped session.
        for database in &databases {
            self.client.login(database, &username, &password).await?;
            let work = self
                .collect_layouts(&mut cache, database, &opts, &mut stats)
                .await;
            let logout = self.client.logout().await;
            work?;
            logout?;
        }

        for pair in &pairs {
            self.client.login(&pair.database, &username, &password).await?;
            let work = self.collect_fields(&mut cache, pair, &opts, &mut stats).await;
            let logout = self.client.logout().await;
            work?;
            logout?;
        }

        stats.tables = self.finalize(cache)?;
        Ok(stats)
    }

    async fn collect_layouts(
        &self,
        cache: &mut WriterCache,
        database: &str,
        opts: &LoadingOptions,
        stats: &mut RunStats,
    ) -> Result<()> {
        let layouts = self.client.list_layouts(database).await?;
        stats.pages += 1;

        let writer = cache.get_or_create(
            LAYOUTS_TABLE,
            self.state.state().schema(LAYOUTS_TABLE).map(Vec::as_slice),
            &[],
            opts.incremental,
        )?;
        write_layout_rows(writer, database, "", &layouts, stats)
    }

    async fn collect_fields(
        &self,
        cache: &mut WriterCache,
        pair: &MetadataLayout,
        opts: &LoadingOptions,
        stats: &mut RunStats,
    ) -> Result<()> {
        let fields = self.client.layout_metadata(&pair.database, &pair.layout).await?;
        stats.pages += 1;

        let writer = cache.get_or_create(
            FIELDS_TABLE,
            self.state.state().schema(FIELDS_TABLE).map(Vec::as_slice),
            &[],
            opts.incremental,
        )?;
        for meta in fields {
            let mut row = JsonObject::new();
            row.insert("database".to_string(), JsonValue::String(pair.database.clone()));
            row.insert("layout".to_string(), JsonValue::String(pair.layout.clone()));
            for (key, value) in meta {
                row.insert(key, value);
            }
            writer.write_row(&row)?;
            stats.rows += 1;
        }
        Ok(())
    }

    /// Close all writers and record their final schemas in the state
    fn finalize(&mut self, cache: WriterCache) -> Result<u64> {
        let finalized = cache.finalize()?;
        let count = finalized.len() as u64;
        for table in finalized {
            self.state.state_mut().set_schema(&table.name, table.columns);
        }
        Ok(count)
    }
}

/// Flatten a layout listing into rows, descending into folders
fn write_layout_rows(
    writer: &mut CsvTableWriter,
    database: &str,
    folder: &str,
    layouts: &[LayoutInfo],
    stats: &mut RunStats,
) -> Result<()> {
    for layout in layouts {
        if layout.is_folder {
            write_layout_rows(writer, database, &layout.name, &layout.folder_layout_names, stats)?;
            continue;
        }
        let mut row = JsonObject::new();
        row.insert("database".to_string(), JsonValue::String(database.to_string()));
        row.insert("name".to_string(), JsonValue::String(layout.name.clone()));
        row.insert("folder".to_string(), JsonValue::String(folder.to_string()));
        writer.write_row(&row)?;
        stats.rows += 1;
    }
    Ok(())
}
