//! Paginated record fetcher
//!
//! Pull-model pagination over the listing and find endpoints: each
//! `next_page()` call issues exactly one request, so one page is fully
//! processed before the next is fetched.

use super::client::DataApiClient;
use super::types::Page;
use crate::error::Result;
use crate::query::{FindRequest, SortSpec};
use crate::types::QueryGroup;
use tracing::debug;

/// Retrieval mode, chosen by presence of a non-empty query
#[derive(Debug)]
enum PagerMode {
    /// Unfiltered listing via repeated GET requests
    List,
    /// Filtered find via repeated POST bodies
    Find {
        query: Vec<QueryGroup>,
        sort: Vec<SortSpec>,
    },
}

/// Lazily paginated sequence of (records, metadata) pages
pub struct RecordPager<'a> {
    client: &'a DataApiClient,
    database: String,
    layout: String,
    mode: PagerMode,
    /// 1-based offset of the next request
    offset: u32,
    page_size: u32,
    done: bool,
}

impl<'a> RecordPager<'a> {
    /// Pager over the unfiltered record listing
    pub fn list(
        client: &'a DataApiClient,
        database: impl Into<String>,
        layout: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            database: database.into(),
            layout: layout.into(),
            mode: PagerMode::List,
            offset: 1,
            page_size,
            done: false,
        }
    }

    /// Pager over a filtered find
    pub fn find(
        client: &'a DataApiClient,
        database: impl Into<String>,
        layout: impl Into<String>,
        query: Vec<QueryGroup>,
        sort: Vec<SortSpec>,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            database: database.into(),
            layout: layout.into(),
            mode: PagerMode::Find { query, sort },
            offset: 1,
            page_size,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the sequence has ended.
    ///
    /// Listing mode continues while a page comes back full; a listing whose
    /// total is an exact multiple of the page size therefore issues one
    /// extra call that yields an empty terminal page, which is part of the
    /// sequence and not an error. Find mode ends on the first empty batch.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.done {
            return Ok(None);
        }

        let page = match &self.mode {
            PagerMode::List => {
                let page = self
                    .client
                    .list_records(&self.database, &self.layout, self.offset, self.page_size)
                    .await?;

                if page.records.len() as u32 == self.page_size {
                    self.offset += self.page_size;
                } else {
                    self.done = true;
                }
                page
            }
            PagerMode::Find { query, sort } => {
                let request = FindRequest {
                    query: query.clone(),
                    sort: sort.clone(),
                    offset: self.offset,
                    limit: self.page_size,
                };
                let page = self
                    .client
                    .find_records(&self.database, &self.layout, &request)
                    .await?;

                if page.records.is_empty() {
                    self.done = true;
                } else {
                    self.offset += self.page_size;
                }
                page
            }
        };

        debug!(
            "Fetched page for layout {}: {} records (table {})",
            self.layout,
            page.records.len(),
            page.info.table
        );
        Ok(Some(page))
    }
}
