//! Metadata table loader
//!
//! The table is a delimited text file whose first row is a header. Three of
//! the header names are designated as the title, track key and artist
//! columns; every other column is ignored.

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Error, Result, TableError};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Header names of the columns that feed the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataColumns {
    pub title: String,
    pub track: String,
    pub artist: String,
}

/// One data row of the table, reduced to the designated columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    /// Track key, joined against file stems
    pub key: String,
    pub title: String,
    pub artist: String,
}

/// Positional indices of the designated columns in the header
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    title: usize,
    track: usize,
    artist: usize,
}

impl ColumnIndices {
    fn locate(header: &csv::StringRecord, columns: &MetadataColumns) -> Option<Self> {
        let position = |name: &str| {
            header
                .iter()
                .position(|cell| cell.trim_start_matches(BYTE_ORDER_MARK) == name)
        };

        let title = position(&columns.title);
        let track = position(&columns.track);
        let artist = position(&columns.artist);

        if title.is_none() {
            log::warn!("metadata column not found column={}", columns.title);
        }
        if track.is_none() {
            log::warn!("metadata column not found column={}", columns.track);
        }
        if artist.is_none() {
            log::warn!("metadata column not found column={}", columns.artist);
        }

        Some(Self {
            title: title?,
            track: track?,
            artist: artist?,
        })
    }

    fn required_len(&self) -> usize {
        self.title.max(self.track).max(self.artist) + 1
    }
}

/// Parse a delimiter setting: a single ASCII character, or `tab` / `\t`
pub fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(Error::InvalidDelimiter(value.to_string())),
            }
        }
    }
}

/// Whether every quoted field is closed
///
/// Opening, closing and escaped (`""`) quotes all come in pairs, so an odd
/// count means a field runs to the end of the input.
fn quotes_balanced(data: &[u8]) -> bool {
    data.iter().filter(|&&b| b == b'"').count() % 2 == 0
}

/// Parse a table held in memory
///
/// Returns an empty list when one of the designated columns is missing from
/// the header. Rows too short to hold every designated column are skipped.
pub fn parse_metadata_table(
    data: &[u8],
    columns: &MetadataColumns,
    delimiter: u8,
) -> std::result::Result<Vec<MetadataRow>, TableError> {
    // The csv reader accepts an unclosed quote and swallows the rest of the table
    if !quotes_balanced(data) {
        return Err(TableError::UnterminatedQuote);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let mut records = reader.records();

    let header = match records.next() {
        Some(header) => header?,
        None => return Ok(Vec::new()),
    };

    let Some(indices) = ColumnIndices::locate(&header, columns) else {
        log::warn!("metadata table lacks required columns, continuing without metadata");
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.len() < indices.required_len() {
            log::debug!(
                "skipping short metadata row line={} fields={}",
                record.position().map(|p| p.line()).unwrap_or(0),
                record.len()
            );
            continue;
        }

        rows.push(MetadataRow {
            key: record[indices.track].to_string(),
            title: record[indices.title].to_string(),
            artist: record[indices.artist].to_string(),
        });
    }

    Ok(rows)
}

/// Open and parse the table at `path`
pub fn load_metadata_table(
    path: &Path,
    columns: &MetadataColumns,
    delimiter: u8,
) -> Result<Vec<MetadataRow>> {
    let data = fs::read(path).map_err(|source| Error::OpenMetadata {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = parse_metadata_table(&data, columns, delimiter).map_err(|source| {
        Error::ParseMetadata {
            path: path.to_path_buf(),
            source,
        }
    })?;

    log::debug!("metadata table loaded path={} rows={}", path.display(), rows.len());

    Ok(rows)
}
