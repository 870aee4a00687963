use tracing::debug;

use crate::error::InsufficientData;
use crate::stats::types::{Route, StationStats};
use crate::stats::utility::mode;
use crate::store::TripRecord;

/// Most common start station, end station and start/end combination.
///
/// The combination is the mode of the joint pair, so it is always a route
/// some trip in `records` actually took.
///
/// # Errors
///
/// Returns [`InsufficientData`] when `records` is empty.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn station_stats(records: &[TripRecord]) -> Result<StationStats, InsufficientData> {
    let common_start_station = mode(records.iter().map(TripRecord::start_station))
        .ok_or(InsufficientData::new("most common start station"))?;
    let common_end_station = mode(records.iter().map(TripRecord::end_station))
        .ok_or(InsufficientData::new("most common end station"))?;
    let (start, end) = mode(records.iter().map(|r| (r.start_station(), r.end_station())))
        .ok_or(InsufficientData::new("most common trip"))?;

    debug!(start, end, "Most common route computed");
    Ok(StationStats {
        common_start_station: common_start_station.to_string(),
        common_end_station: common_end_station.to_string(),
        common_route: Route {
            start: start.to_string(),
            end: end.to_string(),
        },
    })
}
