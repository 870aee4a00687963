use crate::error::InsufficientData;
use crate::stats::types::TripDurationStats;
use crate::stats::utility::mean;
use crate::store::TripRecord;

/// Sum of recorded trip durations in seconds; 0 for empty input.
pub fn total_duration(records: &[TripRecord]) -> f64 {
    records.iter().map(TripRecord::trip_duration).sum()
}

/// Mean recorded trip duration in seconds.
///
/// # Errors
///
/// Returns [`InsufficientData`] when `records` is empty.
pub fn mean_duration(records: &[TripRecord]) -> Result<f64, InsufficientData> {
    let durations: Vec<f64> = records.iter().map(TripRecord::trip_duration).collect();
    mean(&durations).ok_or(InsufficientData::new("mean trip duration"))
}

#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn trip_duration_stats(records: &[TripRecord]) -> TripDurationStats {
    TripDurationStats {
        total_seconds: total_duration(records),
        mean_seconds: mean_duration(records),
    }
}
