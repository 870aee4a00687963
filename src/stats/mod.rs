//! Descriptive statistics over a set of trips.
//!
//! Four independent groups are computed: time of travel, station
//! popularity, trip duration and user demographics. A group that has no
//! defined value for its input reports [`InsufficientData`](crate::error::InsufficientData)
//! without affecting the others.

pub mod duration;
pub mod station;
pub mod time;
pub mod types;
pub mod users;
pub mod utility;

pub use duration::{mean_duration, total_duration, trip_duration_stats};
pub use station::station_stats;
pub use time::time_stats;
pub use types::*;
pub use users::{birth_year_summary, user_stats};

use tracing::info;

use crate::filter::{FilterSpec, filter};
use crate::store::Dataset;

/// Computes every statistic group over `dataset` as given.
pub fn summarize(dataset: &Dataset) -> StatisticsResult {
    let records = dataset.records();
    let result = StatisticsResult {
        city: dataset.city(),
        record_count: records.len(),
        time: time_stats(records),
        stations: station_stats(records),
        duration: trip_duration_stats(records),
        users: user_stats(dataset),
    };
    info!(
        city = %result.city,
        records = result.record_count,
        time_ok = result.time.is_ok(),
        stations_ok = result.stations.is_ok(),
        "Statistics computed"
    );
    result
}

/// Filters `dataset` by `spec` and summarizes what remains.
pub fn query(dataset: &Dataset, spec: &FilterSpec) -> StatisticsResult {
    summarize(&filter(dataset, spec))
}
