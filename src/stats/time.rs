use tracing::debug;

use crate::error::InsufficientData;
use crate::stats::types::{ClockHour, TimeStats};
use crate::stats::utility::mode;
use crate::store::TripRecord;

/// Most common month, weekday and start hour.
///
/// # Errors
///
/// Returns [`InsufficientData`] when `records` is empty.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn time_stats(records: &[TripRecord]) -> Result<TimeStats, InsufficientData> {
    let common_month = mode(records.iter().map(TripRecord::month))
        .ok_or(InsufficientData::new("most common month"))?;
    let common_weekday = mode(records.iter().map(TripRecord::day_of_week))
        .ok_or(InsufficientData::new("most common day of week"))?;
    let common_hour = mode(records.iter().map(TripRecord::hour))
        .ok_or(InsufficientData::new("most common start hour"))?;

    debug!(common_month, %common_weekday, common_hour, "Time of travel computed");
    Ok(TimeStats {
        common_month,
        common_weekday,
        common_hour: ClockHour::new(common_hour),
    })
}
