//! Delimited output
//!
//! One CSV file per logical table, each paired with a JSON manifest
//! describing its columns and load mode. Column names that the delimited
//! format cannot carry verbatim are normalized on the way out and
//! denormalized on the way back in (see [`normalize`]).

mod cache;
mod normalize;
mod writer;

pub use cache::{FinalizedTable, TableManifest, WriterCache};
pub use normalize::{denormalize_columns, normalize_columns, normalize_header};
pub use writer::CsvTableWriter;
