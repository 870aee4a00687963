use tracing::debug;

use crate::error::InsufficientData;
use crate::stats::types::{BirthYearSummary, ColumnStat, Counts, UserStats};
use crate::stats::utility::{mode, value_counts};
use crate::store::{Dataset, TripRecord};

/// Rider counts by user type and gender, and the birth-year summary.
///
/// Gender and birth year are [`ColumnStat::Unsupported`] when the dataset has
/// no such column.
#[tracing::instrument(skip_all, fields(city = %dataset.city(), records = dataset.len()))]
pub fn user_stats(dataset: &Dataset) -> UserStats {
    let records = dataset.records();

    let user_type_counts = owned_counts(records.iter().filter_map(TripRecord::user_type));

    let gender_counts = if dataset.has_gender() {
        ColumnStat::Present(owned_counts(records.iter().filter_map(TripRecord::gender)))
    } else {
        ColumnStat::Unsupported
    };

    let birth_year = if dataset.has_birth_year() {
        ColumnStat::Present(birth_year_summary(records))
    } else {
        ColumnStat::Unsupported
    };

    debug!(
        user_types = user_type_counts.len(),
        has_gender = gender_counts.is_supported(),
        has_birth_year = birth_year.is_supported(),
        "User demographics computed"
    );
    UserStats {
        user_type_counts,
        gender_counts,
        birth_year,
    }
}

fn owned_counts<'a>(values: impl Iterator<Item = &'a str>) -> Counts {
    value_counts(values)
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}

/// Earliest, latest and most common birth year over the records that have one.
///
/// Stored years are truncated to whole years before comparing or counting.
///
/// # Errors
///
/// Returns [`InsufficientData`] when no record carries a birth year.
pub fn birth_year_summary(records: &[TripRecord]) -> Result<BirthYearSummary, InsufficientData> {
    let years: Vec<i32> = records
        .iter()
        .filter_map(TripRecord::birth_year)
        .filter(|y| y.is_finite())
        .map(|y| y.trunc() as i32)
        .collect();

    let insufficient = InsufficientData::new("birth year summary");
    let earliest = years.iter().copied().min().ok_or(insufficient)?;
    let latest = years.iter().copied().max().ok_or(insufficient)?;
    let most_common = mode(years.iter().copied()).ok_or(insufficient)?;

    Ok(BirthYearSummary {
        earliest,
        latest,
        most_common,
    })
}
