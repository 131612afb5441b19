//! FFmpeg subprocess handling for audio conversion

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

use super::cancel::CancelSignal;
use crate::catalog::TrackRecord;
use crate::error::EncodeError;

/// MP3 encoder passed to `-codec:a`
const MP3_CODEC: &str = "libmp3lame";

/// How to launch the encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    /// Program name or path of the ffmpeg binary
    pub program: PathBuf,
    /// Arguments placed before the inputs (e.g. `-hide_banner`)
    pub leading_args: Vec<OsString>,
}

impl Default for EncoderCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            leading_args: Vec::new(),
        }
    }
}

impl EncoderCommand {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Build the ffmpeg argument list for one track
///
/// `jacket` must already be checked for existence; when present it becomes
/// input 1 and is attached as cover art.
pub fn build_encoder_args(
    track: &TrackRecord,
    input_path: &Path,
    jacket: Option<&Path>,
    kbps: u32,
    output_path: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input_path.into()];

    if let Some(jacket) = jacket {
        args.push("-i".into());
        args.push(jacket.into());
    }

    args.push("-codec:a".into());
    args.push(MP3_CODEC.into());
    args.push("-b:a".into());
    args.push(format!("{}k", kbps).into());

    let tags = [
        ("title", track.title.as_str()),
        ("artist", track.artist.as_str()),
        ("album_artist", track.album_artist.as_str()),
        ("album", track.album.as_str()),
        ("date", track.release.as_str()),
        ("genre", track.genre.as_str()),
    ];
    for (name, value) in tags {
        args.push("-metadata".into());
        args.push(format!("{}={}", name, value).into());
    }
    args.push("-metadata".into());
    args.push(format!("track={}", track.track_number).into());

    if jacket.is_some() {
        for arg in ["-map", "0:a", "-map", "1:v", "-c:v", "copy", "-disposition:v", "attached_pic"] {
            args.push(arg.into());
        }
    }

    args.push("-y".into());
    args.push(output_path.into());

    args
}

/// Join stdout and stderr of a finished process
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (true, _) => stderr.trim_end().to_string(),
        (false, true) => stdout.trim_end().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim_end(), stderr.trim_end()),
    }
}

async fn wait_output(mut cmd: Command, program: String, timeout: Option<Duration>) -> Result<Output, EncodeError> {
    let output = cmd.output();
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, output)
            .await
            .map_err(|_| EncodeError::TimedOut(limit))?,
        None => output.await,
    };
    result.map_err(|source| EncodeError::Spawn { program, source })
}

/// Run the encoder with `args` and wait for it to finish
///
/// The child is killed when `cancel` fires or `timeout` expires.
pub async fn run_encoder(
    encoder: &EncoderCommand,
    args: &[OsString],
    timeout: Option<Duration>,
    cancel: &mut CancelSignal,
) -> Result<(), EncodeError> {
    if cancel.is_cancelled() {
        return Err(EncodeError::Cancelled);
    }

    let mut cmd = encoder.command();
    cmd.args(args);
    log::debug!("executing encoder command={:?}", cmd.as_std());

    let output = tokio::select! {
        result = wait_output(cmd, encoder.program_name(), timeout) => result?,
        () = cancel.cancelled() => return Err(EncodeError::Cancelled),
    };

    if output.status.success() {
        Ok(())
    } else {
        Err(EncodeError::Failed {
            status: output.status,
            output: combined_output(&output),
        })
    }
}

/// Run `<encoder> -version` and return the first line of its banner
pub async fn probe_encoder(encoder: &EncoderCommand) -> Result<String, EncodeError> {
    let mut cmd = encoder.command();
    cmd.arg("-version");

    let output = wait_output(cmd, encoder.program_name(), Some(Duration::from_secs(10))).await?;
    if !output.status.success() {
        return Err(EncodeError::Failed {
            status: output.status,
            output: combined_output(&output),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}
