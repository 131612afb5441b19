//! Catalog/table merge

use super::table::MetadataRow;
use crate::catalog::Catalog;

/// Outcome of merging table rows into the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub matched: usize,
    pub unmatched: usize,
}

/// Fill title and artist of every record whose key matches a table row
///
/// Rows without a matching record are dropped; they never create entries.
pub fn merge_metadata(catalog: &mut Catalog, rows: &[MetadataRow]) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for row in rows {
        match catalog.get_mut(&row.key) {
            Some(record) => {
                record.title.clone_from(&row.title);
                record.artist.clone_from(&row.artist);
                summary.matched += 1;
            }
            None => {
                log::warn!("metadata row has no matching file key={}", row.key);
                summary.unmatched += 1;
            }
        }
    }

    let untitled = catalog.values().filter(|r| r.title.is_empty()).count();
    log::info!(
        "metadata merged matched={} unmatched={} untitled_tracks={}",
        summary.matched,
        summary.unmatched,
        untitled
    );

    summary
}
