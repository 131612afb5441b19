//! The conversion run
//!
//! Ties the pieces together: scan the input directory, merge the metadata
//! table, then either print the catalog (dry run) or convert every track.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::catalog::{build_catalog, AlbumInfo, Catalog};
use crate::conversion::{encode_track, probe_encoder, CancelSignal, EncodeSettings, TrackStatus};
use crate::error::{Error, Result};
use crate::metadata::{load_metadata_table, merge_metadata, MetadataColumns};

/// Fully resolved settings of one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub album: AlbumInfo,
    pub metadata_path: PathBuf,
    pub columns: MetadataColumns,
    pub delimiter: u8,
    pub encode: EncodeSettings,
    pub dry_run: bool,
}

/// Per-run track counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tracks: usize,
    pub encoded: usize,
    pub failed: usize,
    pub not_found: usize,
}

/// A conversion run, built once from resolved options
#[derive(Debug)]
pub struct Converter {
    options: RunOptions,
}

impl Converter {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Scan the input directory and fill titles/artists from the table
    pub fn build_catalog(&self) -> Result<Catalog> {
        self.log_options();
        let options = &self.options;
        let mut catalog = build_catalog(&options.encode.input_dir, &options.album)?;
        let rows = load_metadata_table(&options.metadata_path, &options.columns, options.delimiter)?;
        let merged = merge_metadata(&mut catalog, &rows);
        if merged.matched == 0 && !catalog.is_empty() {
            log::warn!(
                "no metadata row matched a file, check --tracknumber column={} rows={}",
                options.columns.track,
                rows.len()
            );
        }
        Ok(catalog)
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// Write the catalog to `out` as one line of JSON
    pub fn print_catalog<W: Write>(&self, catalog: &Catalog, out: &mut W) -> Result<()> {
        log::info!("dry run tracks={}", catalog.len());
        serde_json::to_writer(&mut *out, catalog)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    /// Encode every cataloged track, one at a time
    pub async fn convert(&self, catalog: &Catalog, mut cancel: CancelSignal) -> Result<RunSummary> {
        let started = Instant::now();

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let settings = &self.options.encode;
        fs::create_dir_all(&settings.output_dir).map_err(|source| Error::CreateOutputDir {
            path: settings.output_dir.clone(),
            source,
        })?;

        let probe = tokio::select! {
            result = probe_encoder(&settings.encoder) => result,
            () = cancel.cancelled() => return Err(Error::Cancelled),
        };
        match probe {
            Ok(banner) => log::debug!("encoder found version={}", banner),
            Err(e) => log::warn!("encoder probe failed, conversions will likely fail error={}", e),
        }

        let mut summary = RunSummary {
            tracks: catalog.len(),
            ..Default::default()
        };

        for track in catalog.values() {
            let result = encode_track(track, settings, &mut cancel).await;
            log::debug!(
                "track done key={} input={} output={} status={:?}",
                result.key,
                result.input_path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
                result.output_path.display(),
                result.status
            );
            match result.status {
                TrackStatus::Encoded => summary.encoded += 1,
                TrackStatus::NotFound => summary.not_found += 1,
                TrackStatus::Failed(_) => summary.failed += 1,
            }

            if cancel.is_cancelled() {
                log::warn!(
                    "run cancelled encoded={} remaining={}",
                    summary.encoded,
                    summary.tracks - summary.encoded - summary.failed - summary.not_found
                );
                return Err(Error::Cancelled);
            }
        }

        log::info!(
            "run finished tracks={} encoded={} failed={} not_found={} elapsed={:?}",
            summary.tracks,
            summary.encoded,
            summary.failed,
            summary.not_found,
            started.elapsed()
        );

        Ok(summary)
    }

    fn log_options(&self) {
        let options = &self.options;
        let encode = &options.encode;
        log::debug!(
            "options input={} output={} kbps={} artist={} album={} release={} genre={} jacket={} \
             metadata={} title={} tracknumber={} artistcolumn={} ext={} ffmpeg={} dryrun={}",
            encode.input_dir.display(),
            encode.output_dir.display(),
            encode.kbps,
            options.album.album_artist,
            options.album.album,
            options.album.release,
            options.album.genre,
            options
                .album
                .jacket_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            options.metadata_path.display(),
            options.columns.title,
            options.columns.track,
            options.columns.artist,
            encode.preferred_extension,
            encode.encoder.program.display(),
            options.dry_run
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::EncoderCommand;
    use crate::test_fixtures::{sample_columns, touch, write_file};
    use std::path::Path;
    use tempfile::TempDir;

    const SAMPLE_TABLE: &str = "id,name,author\n01song,MySong,MyArtist\n99missing,Ghost,Nobody\n";

    fn options(dir: &Path, encoder: EncoderCommand, dry_run: bool) -> RunOptions {
        RunOptions {
            album: AlbumInfo {
                album_artist: "Various".to_string(),
                album: "Vol.1".to_string(),
                release: "2025".to_string(),
                genre: "Compilation".to_string(),
                jacket_path: Some(dir.join("jacket.jpg")),
            },
            metadata_path: dir.join("input.csv"),
            columns: sample_columns(),
            delimiter: b',',
            encode: EncodeSettings {
                input_dir: dir.join("musics"),
                output_dir: dir.join("output"),
                kbps: 320,
                preferred_extension: "wav".to_string(),
                encoder,
                timeout: None,
            },
            dry_run,
        }
    }

    fn sample_input(dir: &Path) {
        let musics = dir.join("musics");
        fs::create_dir(&musics).unwrap();
        touch(&musics, "01song.wav");
        touch(&musics, "02b.flac");
        write_file(dir, "input.csv", SAMPLE_TABLE);
    }

    #[test]
    fn test_build_catalog_end_to_end() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());

        let catalog = Converter::new(options(dir.path(), EncoderCommand::default(), true))
            .build_catalog()
            .unwrap();

        let song = &catalog["01song"];
        assert_eq!(song.track_number, 1);
        assert_eq!(song.title, "MySong");
        assert_eq!(song.artist, "MyArtist");
        assert_eq!(song.album, "Vol.1");
        assert!(catalog["02b"].title.is_empty());
        assert!(!catalog.contains_key("99missing"));
    }

    #[test]
    fn test_missing_columns_leave_records_empty() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());
        write_file(dir.path(), "input.csv", "id,name,composer\n01song,MySong,MyArtist\n");

        let catalog = Converter::new(options(dir.path(), EncoderCommand::default(), true))
            .build_catalog()
            .unwrap();

        assert!(catalog.values().all(|r| r.title.is_empty() && r.artist.is_empty()));
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());
        fs::remove_file(dir.path().join("input.csv")).unwrap();

        let result = Converter::new(options(dir.path(), EncoderCommand::default(), true)).build_catalog();

        assert!(matches!(result, Err(Error::OpenMetadata { .. })));
    }

    #[test]
    fn test_dry_run_prints_catalog_without_writing() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());
        let converter = Converter::new(options(dir.path(), EncoderCommand::default(), true));
        let mut out = Vec::new();

        let catalog = converter.build_catalog().unwrap();
        converter.print_catalog(&catalog, &mut out).unwrap();

        assert!(converter.is_dry_run());
        assert!(!dir.path().join("output").exists());

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let entries = printed.as_object().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["01song"]["title"], "MySong");
        assert_eq!(entries["01song"]["trackNumber"], 1);
        assert_eq!(entries["02b"]["title"], "");
        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[tokio::test]
    async fn test_uncreatable_output_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());
        let mut options = options(dir.path(), EncoderCommand::default(), false);
        // A regular file blocks the directory path
        options.encode.output_dir = touch(dir.path(), "output-file").join("nested");
        let converter = Converter::new(options);

        let catalog = converter.build_catalog().unwrap();
        let result = converter.convert(&catalog, CancelSignal::never()).await;

        assert!(matches!(result, Err(Error::CreateOutputDir { .. })));
    }

    #[tokio::test]
    async fn test_cancel_before_convert_writes_nothing() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());
        let converter = Converter::new(options(dir.path(), EncoderCommand::default(), false));
        let catalog = converter.build_catalog().unwrap();
        let (trigger, signal) = crate::conversion::cancel_pair();
        trigger.cancel();

        let result = converter.convert(&catalog, signal).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(!dir.path().join("output").exists());
    }

    #[test]
    fn test_malformed_table_is_fatal() {
        let dir = TempDir::new().unwrap();
        sample_input(dir.path());
        write_file(dir.path(), "input.csv", "id,name,author\n01song,\"MySong,MyArtist\n");

        let result = Converter::new(options(dir.path(), EncoderCommand::default(), true)).build_catalog();

        assert!(matches!(result, Err(Error::ParseMetadata { .. })));
    }

    #[cfg(unix)]
    mod with_encoder {
        use super::*;
        use crate::test_fixtures::{failing_encoder, hanging_encoder, recording_encoder};

        async fn convert(converter: &Converter, cancel: CancelSignal) -> Result<RunSummary> {
            let catalog = converter.build_catalog()?;
            converter.convert(&catalog, cancel).await
        }

        #[tokio::test]
        async fn test_run_converts_every_track() {
            let dir = TempDir::new().unwrap();
            sample_input(dir.path());
            let converter = Converter::new(options(dir.path(), recording_encoder(), false));

            let summary = convert(&converter, CancelSignal::never()).await.unwrap();

            assert_eq!(
                summary,
                RunSummary {
                    tracks: 2,
                    encoded: 2,
                    failed: 0,
                    not_found: 0
                }
            );

            let output_dir = dir.path().join("output");
            let song = fs::read_to_string(output_dir.join("01song「MySong」MyArtist.mp3")).unwrap();
            assert!(song.lines().any(|l| l == "title=MySong"));
            assert!(song.lines().any(|l| l == "track=1"));
            // jacket.jpg does not exist, so no artwork is attached
            assert!(!song.contains("attached_pic"));
            assert!(output_dir.join("02b「」.mp3").exists());
        }

        #[tokio::test]
        async fn test_failures_do_not_abort_run() {
            let dir = TempDir::new().unwrap();
            sample_input(dir.path());
            write_file(dir.path(), "input.csv", "id,name,author\n03gone,Gone,Nobody\n");
            touch(&dir.path().join("musics"), "03gone.mp3");
            let converter = Converter::new(options(dir.path(), failing_encoder(), false));

            let summary = convert(&converter, CancelSignal::never()).await.unwrap();

            assert_eq!(
                summary,
                RunSummary {
                    tracks: 3,
                    encoded: 0,
                    failed: 2,
                    not_found: 1
                }
            );
        }

        #[tokio::test]
        async fn test_cancel_stops_run() {
            let dir = TempDir::new().unwrap();
            sample_input(dir.path());
            let (trigger, signal) = crate::conversion::cancel_pair();
            let converter = Converter::new(options(dir.path(), hanging_encoder(), false));

            let run = convert(&converter, signal);
            let cancel = async {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                trigger.cancel();
            };
            let (result, ()) = tokio::join!(run, cancel);

            assert!(matches!(result, Err(Error::Cancelled)));
        }
    }
}
