//! Session-authenticated extractor for paginated record APIs.
//!
//! Opens a token-scoped session against a database, pages through a
//! layout's records (unfiltered listing or filtered find), streams the
//! rows into per-table CSV files with schema-stable headers, and tracks
//! per-field watermarks so subsequent runs fetch only what changed. A
//! metadata mode enumerates databases, layouts and field definitions
//! instead.
//!
//! The whole pipeline is sequential on purpose: one session, one request
//! in flight, pages processed in order. Watermark correctness and the
//! server's session limits both depend on it.

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod output;
pub mod query;
pub mod state;
pub mod types;
pub mod watermark;

pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
