//! Track catalog
//!
//! This module contains:
//! - The per-file track record and the album-level constants shared by all of them
//! - Directory scanning and track number derivation

mod scanning;
mod track;

pub use scanning::build_catalog;
pub use track::{AlbumInfo, Catalog, TrackRecord};
