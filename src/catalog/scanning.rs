//! Input directory scanning
//!
//! Builds the catalog from the files directly inside the input directory.
//! Subdirectories are skipped, not descended into.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::track::{AlbumInfo, Catalog, TrackRecord};
use crate::error::{Error, Result};

/// Strip the extension (everything from the last `.`) from a file name
///
/// `"01song.wav"` -> `"01song"`, `"a.b.flac"` -> `"a.b"`, `"README"` -> `"README"`
pub fn split_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Parse the leading run of decimal digits of a stem
///
/// Returns 0 when the stem does not start with a digit or the digits do not
/// fit into a `u64`.
pub fn track_number_from_stem(stem: &str) -> u64 {
    let digits_len = stem
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stem.len());

    stem[..digits_len].parse().unwrap_or(0)
}

/// Scan `input_dir` and build one record per file stem
pub fn build_catalog(input_dir: &Path, album: &AlbumInfo) -> Result<Catalog> {
    let metadata = fs::metadata(input_dir).map_err(|source| Error::ReadInputDir {
        path: input_dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory(input_dir.to_path_buf()));
    }

    let mut catalog = Catalog::new();

    // Sorted so that duplicate stems resolve the same way on every filesystem
    let entries = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry.map_err(|e| Error::ReadInputDir {
            path: input_dir.to_path_buf(),
            source: e.into(),
        })?;

        if entry.file_type().is_dir() {
            log::debug!("skipping directory path={}", entry.path().display());
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let stem = split_stem(&file_name);

        if catalog.contains_key(stem) {
            log::debug!("duplicate stem, keeping first entry key={} file={}", stem, file_name);
            continue;
        }

        let track_number = track_number_from_stem(stem);
        catalog.insert(stem.to_string(), TrackRecord::new(stem, track_number, album));
    }

    log::debug!("catalog built dir={} tracks={}", input_dir.display(), catalog.len());

    Ok(catalog)
}
