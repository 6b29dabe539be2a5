//! Data API protocol client
//!
//! Session handshake, the paginated record fetcher and the metadata
//! listing calls. All requests go through the retrying HTTP transport;
//! this module only sees terminal responses.

mod client;
mod pager;
mod types;

pub use client::DataApiClient;
pub use pager::RecordPager;
pub use types::{LayoutInfo, Page, PageInfo, Record};

#[cfg(test)]
mod tests;
