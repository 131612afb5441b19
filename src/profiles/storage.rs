//! Profile storage for saving/loading run settings

use super::types::RunProfile;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Save a run profile to a file
pub fn save_profile(profile: &RunProfile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::WriteProfile {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, json).map_err(|source| Error::WriteProfile {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("profile saved path={}", path.display());
    Ok(())
}

/// Load a run profile from a file
pub fn load_profile(path: &Path) -> Result<RunProfile> {
    let contents = fs::read_to_string(path).map_err(|source| Error::ReadProfile {
        path: path.to_path_buf(),
        source,
    })?;

    let profile = serde_json::from_str(&contents).map_err(|source| Error::ParseProfile {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("profile loaded path={}", path.display());
    Ok(profile)
}
