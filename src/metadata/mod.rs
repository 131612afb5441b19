//! Metadata table handling
//!
//! Loads the companion spreadsheet (exported as delimited text) and merges
//! its titles and artists into the track catalog.

mod merge;
mod table;

pub use merge::merge_metadata;
pub use table::{load_metadata_table, parse_delimiter, MetadataColumns};
