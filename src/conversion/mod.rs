//! Audio conversion module
//!
//! Resolves the source file of each cataloged track and transcodes it to a
//! tagged MP3 using ffmpeg. Tracks are converted one at a time.

mod cancel;
mod ffmpeg;

pub use cancel::{cancel_on_ctrl_c, cancel_pair, CancelSignal};
pub use ffmpeg::{build_encoder_args, probe_encoder, run_encoder, EncoderCommand};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::TrackRecord;
use crate::error::EncodeError;

/// Extensions tried, in order, when the preferred one does not exist
pub const FALLBACK_EXTENSIONS: [&str; 4] = ["flac", "m4a", "aac", "ogg"];

/// Extension of every output file
pub const OUTPUT_EXTENSION: &str = "mp3";

/// Per-run settings shared by every track conversion
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Target bitrate in kbps
    pub kbps: u32,
    /// Source extension tried first, without the leading dot
    pub preferred_extension: String,
    pub encoder: EncoderCommand,
    /// Kill the encoder if a single track takes longer than this
    pub timeout: Option<Duration>,
}

/// Final state of one track
#[derive(Debug)]
pub enum TrackStatus {
    Encoded,
    /// No source file under any tried extension
    NotFound,
    Failed(EncodeError),
}

/// Result of a track conversion
#[derive(Debug)]
pub struct ConversionResult {
    pub key: String,
    /// Resolved source file (None when not found)
    pub input_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub status: TrackStatus,
}

/// Ordered list of source extensions to try: the preferred one, then the
/// fallbacks it does not duplicate
pub fn candidate_extensions(preferred: &str) -> Vec<&str> {
    let preferred = preferred.trim_start_matches('.');
    let mut extensions = vec![preferred];
    extensions.extend(
        FALLBACK_EXTENSIONS
            .iter()
            .copied()
            .filter(|ext| !ext.eq_ignore_ascii_case(preferred)),
    );
    extensions
}

/// First candidate accepted by `exists`
pub fn first_existing<I>(candidates: I, exists: impl Fn(&Path) -> bool) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find(|path| exists(path))
}

/// Locate the source file of `key` in `input_dir`
pub fn resolve_source(input_dir: &Path, key: &str, preferred_extension: &str) -> Option<PathBuf> {
    let candidates = candidate_extensions(preferred_extension)
        .into_iter()
        .map(|ext| input_dir.join(format!("{}.{}", key, ext)));

    first_existing(candidates, Path::is_file)
}

/// File name of the converted track: `<key>「<title>」<artist>.mp3`
///
/// Path separators in the parts are replaced with `_`.
pub fn output_file_name(track: &TrackRecord) -> String {
    let name = format!("{}「{}」{}.{}", track.key, track.title, track.artist, OUTPUT_EXTENSION);
    name.chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect()
}

pub fn output_path(output_dir: &Path, track: &TrackRecord) -> PathBuf {
    output_dir.join(output_file_name(track))
}

/// Existing jacket image of the track, warning when it is configured but missing
fn resolve_jacket(track: &TrackRecord) -> Option<&Path> {
    let jacket = track.jacket_path.as_deref()?;
    if jacket.is_file() {
        log::debug!("jacket image found path={}", jacket.display());
        Some(jacket)
    } else {
        log::warn!("jacket image not found, encoding without artwork path={}", jacket.display());
        None
    }
}

/// Convert one track; failures are reported in the result, never propagated
pub async fn encode_track(
    track: &TrackRecord,
    settings: &EncodeSettings,
    cancel: &mut CancelSignal,
) -> ConversionResult {
    let output_path = output_path(&settings.output_dir, track);

    let Some(input_path) = resolve_source(&settings.input_dir, &track.key, &settings.preferred_extension) else {
        log::warn!("input file not found key={} dir={}", track.key, settings.input_dir.display());
        return ConversionResult {
            key: track.key.clone(),
            input_path: None,
            output_path,
            status: TrackStatus::NotFound,
        };
    };

    let jacket = resolve_jacket(track);
    let args = build_encoder_args(track, &input_path, jacket, settings.kbps, &output_path);

    log::debug!(
        "converting key={} input={} output={} kbps={} has_jacket={}",
        track.key,
        input_path.display(),
        output_path.display(),
        settings.kbps,
        jacket.is_some()
    );

    let status = match run_encoder(&settings.encoder, &args, settings.timeout, cancel).await {
        Ok(()) => {
            log::info!(
                "converted successfully input={} output={}",
                input_path.display(),
                output_path.display()
            );
            TrackStatus::Encoded
        }
        Err(e) => {
            log::error!(
                "failed to convert file input={} output={} error={}",
                input_path.display(),
                output_path.display(),
                e
            );
            TrackStatus::Failed(e)
        }
    };

    ConversionResult {
        key: track.key.clone(),
        input_path: Some(input_path),
        output_path,
        status,
    }
}
