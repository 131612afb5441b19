//! Test fixtures
//!
//! Helpers for building input directories and metadata tables, plus fake
//! encoders: POSIX `sh` scripts standing in for ffmpeg so conversion can be
//! tested without a real encoder installed.

#![cfg(test)]

use std::path::{Path, PathBuf};

use crate::conversion::EncoderCommand;
use crate::metadata::MetadataColumns;

/// Create an empty file and return its path
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    write_file(dir, name, "")
}

/// Write `contents` to `dir/name` and return its path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

/// Columns matching the `id,name,author` sample tables
pub fn sample_columns() -> MetadataColumns {
    MetadataColumns {
        title: "name".to_string(),
        track: "id".to_string(),
        artist: "author".to_string(),
    }
}

/// Encoder running `script` through `sh -c`; ffmpeg arguments arrive as `$1..`
pub fn script_encoder(script: &str) -> EncoderCommand {
    EncoderCommand {
        program: PathBuf::from("sh"),
        leading_args: vec!["-c".into(), script.into(), "ffmpeg".into()],
    }
}

/// Encoder writing its arguments, one per line, into the output path (last argument)
///
/// Answers `-version` probes without writing anything.
pub fn recording_encoder() -> EncoderCommand {
    script_encoder(
        r#"[ "$1" = -version ] && { echo 'ffmpeg version recording'; exit 0; }
for last; do :; done; printf '%s\n' "$@" > "$last""#,
    )
}

/// Encoder that answers `-version` probes but hangs on conversions
///
/// The shell execs into `sleep` so killing the child kills the sleeper.
pub fn hanging_encoder() -> EncoderCommand {
    script_encoder(r#"[ "$1" = -version ] && exit 0; exec sleep 5"#)
}

/// Encoder exiting with status 3 and a diagnostic on stderr
pub fn failing_encoder() -> EncoderCommand {
    script_encoder("echo 'encoder exploded' >&2; exit 3")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::conversion::{run_encoder, CancelSignal};
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_recording_encoder_writes_args() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.mp3");
        let args: Vec<OsString> = vec!["-metadata".into(), "title=With Space".into(), out.clone().into()];

        run_encoder(&recording_encoder(), &args, None, &mut CancelSignal::never())
            .await
            .unwrap();

        let recorded = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            recorded.lines().collect::<Vec<_>>(),
            vec!["-metadata", "title=With Space", out.to_str().unwrap()]
        );
    }
}
