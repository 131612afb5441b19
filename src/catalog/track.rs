//! Track record types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Ordered mapping from track key (file stem) to its record
pub type Catalog = BTreeMap<String, TrackRecord>;

/// Album-level metadata, identical for every track in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumInfo {
    pub album_artist: String,
    pub album: String,
    pub release: String,
    pub genre: String,
    /// Cover art embedded into every output (None = no artwork)
    pub jacket_path: Option<PathBuf>,
}

/// Metadata for one discovered input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// File stem, used as catalog key and as join key against the table
    pub key: String,
    /// Filled from the metadata table, empty when no row matched
    pub title: String,
    /// Filled from the metadata table, empty when no row matched
    pub artist: String,
    pub album_artist: String,
    pub album: String,
    pub release: String,
    pub genre: String,
    pub jacket_path: Option<PathBuf>,
    /// Leading digits of the key (0 when there are none)
    pub track_number: u64,
}

impl TrackRecord {
    pub fn new(key: impl Into<String>, track_number: u64, album: &AlbumInfo) -> Self {
        Self {
            key: key.into(),
            title: String::new(),
            artist: String::new(),
            album_artist: album.album_artist.clone(),
            album: album.album.clone(),
            release: album.release.clone(),
            genre: album.genre.clone(),
            jacket_path: album.jacket_path.clone(),
            track_number,
        }
    }
}
