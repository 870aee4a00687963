//! Fixed-size windows over the unfiltered trip log.

use crate::store::{Dataset, TripRecord};

/// Number of records returned per page.
pub const PAGE_SIZE: usize = 5;

/// Returns up to [`PAGE_SIZE`] records starting at `offset`.
///
/// An `offset` at or past the end yields an empty slice.
pub fn page(dataset: &Dataset, offset: usize) -> &[TripRecord] {
    let records = dataset.records();
    let start = offset.min(records.len());
    let end = start.saturating_add(PAGE_SIZE).min(records.len());
    &records[start..end]
}

/// Offset of the page following the one at `offset`.
pub fn next_offset(offset: usize) -> usize {
    offset.saturating_add(PAGE_SIZE)
}
