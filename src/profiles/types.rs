//! Run profile types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Saved settings for a conversion run; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Target bitrate in kbps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kbps: Option<u32>,

    // === Album-level metadata ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Cover art path; an empty string disables artwork
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jacket: Option<PathBuf>,

    // === Metadata table ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    // === Encoder ===
    /// Preferred source extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ffmpeg_args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}
