//! Command-line interface
//!
//! Every value flag is optional so that a run profile can fill the gaps.
//! Precedence is: flag, then profile, then the built-in default.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::catalog::AlbumInfo;
use crate::command::RunOptions;
use crate::conversion::{EncodeSettings, EncoderCommand};
use crate::error::Result;
use crate::logging::{get_log_file_path, LogConfig};
use crate::metadata::{parse_delimiter, MetadataColumns};
use crate::profiles::RunProfile;

const DEFAULT_INPUT_DIR: &str = "tmp/musics";
const DEFAULT_OUTPUT_DIR: &str = "tmp/output";
const DEFAULT_KBPS: u32 = 320;
const DEFAULT_ALBUM_ARTIST: &str = "WaterplantCompilationVol1";
const DEFAULT_ALBUM: &str = "WaterplantCompilation Vol.1";
const DEFAULT_RELEASE: &str = "2025";
const DEFAULT_GENRE: &str = "Compilation";
const DEFAULT_JACKET: &str = "tmp/jacket.jpg";
const DEFAULT_METADATA: &str = "tmp/input.csv";
const DEFAULT_TITLE_COLUMN: &str = "曲名";
const DEFAULT_TRACK_COLUMN: &str = "アルバム番号";
const DEFAULT_ARTIST_COLUMN: &str = "作曲者";
const DEFAULT_EXTENSION: &str = "wav";
const DEFAULT_DELIMITER: &str = ",";
const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Convert a folder of audio files to tagged MP3s using a metadata spreadsheet
#[derive(Debug, Parser)]
#[command(name = "mp3-meta", version, about)]
pub struct Cli {
    /// Input directory
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Target bitrate in kbps [default: 320]
    #[arg(short, long)]
    pub kbps: Option<u32>,

    /// Album artist
    #[arg(long)]
    pub artist: Option<String>,

    /// Album
    #[arg(long)]
    pub album: Option<String>,

    /// Release date
    #[arg(long)]
    pub release: Option<String>,

    /// Genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Jacket image path (empty to disable cover art)
    #[arg(long, value_name = "PATH")]
    pub jacket: Option<String>,

    /// Metadata csv path
    #[arg(long, value_name = "PATH")]
    pub metadata: Option<PathBuf>,

    /// Title column
    #[arg(long, value_name = "COLUMN")]
    pub title: Option<String>,

    /// Track number column (values are matched against file names without extension)
    #[arg(long, value_name = "COLUMN")]
    pub tracknumber: Option<String>,

    /// Artist column
    #[arg(long, value_name = "COLUMN")]
    pub artistcolumn: Option<String>,

    /// Print the catalog as JSON instead of converting
    #[arg(short, long)]
    pub dryrun: bool,

    /// Preferred source extension [default: wav]
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Metadata table delimiter, a single character or `tab` [default: ,]
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// ffmpeg program [default: ffmpeg]
    #[arg(long, value_name = "PROGRAM")]
    pub ffmpeg: Option<PathBuf>,

    /// Extra ffmpeg argument placed before the inputs (repeatable)
    #[arg(long = "ffmpeg-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub ffmpeg_args: Vec<String>,

    /// Kill the encoder if a single track takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Load default settings from a JSON run profile
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Write the resolved settings as a JSON run profile
    #[arg(long, value_name = "FILE")]
    pub save_profile: Option<PathBuf>,

    /// Terminal log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Also append logs to a file (default location when no path is given)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub log_file: Option<Option<PathBuf>>,
}

/// Empty path means "no jacket"
fn non_empty_path(path: PathBuf) -> Option<PathBuf> {
    if path.as_os_str().is_empty() { None } else { Some(path) }
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        let file = match &self.log_file {
            Some(Some(path)) => Some(path.clone()),
            Some(None) => get_log_file_path(),
            None => None,
        };
        LogConfig {
            level: self.log_level,
            file,
        }
    }

    /// Merge flags over `profile` over the defaults
    pub fn resolve(&self, profile: RunProfile) -> Result<RunOptions> {
        fn pick<T>(flag: &Option<T>, profile: Option<T>, default: impl Into<T>) -> T
        where
            T: Clone,
        {
            flag.clone().or(profile).unwrap_or_else(|| default.into())
        }

        let delimiter = pick(&self.delimiter, profile.delimiter, DEFAULT_DELIMITER);
        let extension: String = pick(&self.ext, profile.extension, DEFAULT_EXTENSION);

        let ffmpeg_args = if self.ffmpeg_args.is_empty() {
            profile.ffmpeg_args
        } else {
            self.ffmpeg_args.clone()
        };

        Ok(RunOptions {
            album: AlbumInfo {
                album_artist: pick(&self.artist, profile.album_artist, DEFAULT_ALBUM_ARTIST),
                album: pick(&self.album, profile.album, DEFAULT_ALBUM),
                release: pick(&self.release, profile.release, DEFAULT_RELEASE),
                genre: pick(&self.genre, profile.genre, DEFAULT_GENRE),
                jacket_path: non_empty_path(pick(
                    &self.jacket.as_ref().map(PathBuf::from),
                    profile.jacket,
                    DEFAULT_JACKET,
                )),
            },
            metadata_path: pick(&self.metadata, profile.metadata, DEFAULT_METADATA),
            columns: MetadataColumns {
                title: pick(&self.title, profile.title_column, DEFAULT_TITLE_COLUMN),
                track: pick(&self.tracknumber, profile.track_column, DEFAULT_TRACK_COLUMN),
                artist: pick(&self.artistcolumn, profile.artist_column, DEFAULT_ARTIST_COLUMN),
            },
            delimiter: parse_delimiter(&delimiter)?,
            encode: EncodeSettings {
                input_dir: pick(&self.input, profile.input_dir, DEFAULT_INPUT_DIR),
                output_dir: pick(&self.output, profile.output_dir, DEFAULT_OUTPUT_DIR),
                kbps: pick(&self.kbps, profile.kbps, DEFAULT_KBPS),
                preferred_extension: extension.trim_start_matches('.').to_string(),
                encoder: EncoderCommand {
                    program: pick(&self.ffmpeg, profile.ffmpeg, DEFAULT_FFMPEG),
                    leading_args: ffmpeg_args.into_iter().map(OsString::from).collect(),
                },
                timeout: self.timeout.or(profile.timeout_secs).map(Duration::from_secs),
            },
            dry_run: self.dryrun,
        })
    }
}

impl From<&RunOptions> for RunProfile {
    fn from(options: &RunOptions) -> Self {
        let encode = &options.encode;
        Self {
            input_dir: Some(encode.input_dir.clone()),
            output_dir: Some(encode.output_dir.clone()),
            kbps: Some(encode.kbps),
            album_artist: Some(options.album.album_artist.clone()),
            album: Some(options.album.album.clone()),
            release: Some(options.album.release.clone()),
            genre: Some(options.album.genre.clone()),
            jacket: Some(options.album.jacket_path.clone().unwrap_or_default()),
            metadata: Some(options.metadata_path.clone()),
            title_column: Some(options.columns.title.clone()),
            track_column: Some(options.columns.track.clone()),
            artist_column: Some(options.columns.artist.clone()),
            delimiter: Some(match options.delimiter {
                b'\t' => "tab".to_string(),
                c => char::from(c).to_string(),
            }),
            extension: Some(encode.preferred_extension.clone()),
            ffmpeg: Some(encode.encoder.program.clone()),
            ffmpeg_args: encode
                .encoder
                .leading_args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            timeout_secs: encode.timeout.map(|t| t.as_secs()),
        }
    }
}
