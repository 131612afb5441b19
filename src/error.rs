//! Error types
//!
//! `Error` covers everything that aborts a run. Failures that only affect a
//! single track are reported through [`EncodeError`] and never abort the run.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Run-fatal errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read input directory {}: {source}", .path.display())]
    ReadInputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open metadata table {}: {source}", .path.display())]
    OpenMetadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed metadata table {}: {source}", .path.display())]
    ParseMetadata {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    #[error("failed to read profile {}: {source}", .path.display())]
    ReadProfile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid profile {}: {source}", .path.display())]
    ParseProfile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write profile {}: {source}", .path.display())]
    WriteProfile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid delimiter {0:?}: expected a single ASCII character")]
    InvalidDelimiter(String),

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Structural problems in a metadata table
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("unterminated quoted field")]
    UnterminatedQuote,
}

/// Per-track encoder failures
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("encoder exited with {status}, output: {output}")]
    Failed { status: ExitStatus, output: String },

    #[error("encoder timed out after {0:?}")]
    TimedOut(Duration),

    #[error("encoder interrupted")]
    Cancelled,
}
