//! Result types produced by the statistics groups.

use std::fmt;

use chrono::Weekday;
use serde::Serialize;

use crate::calendar::{City, month_name, weekday_name};
use crate::error::InsufficientData;

/// AM/PM tag of a [`ClockHour`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Meridiem {
    AM,
    PM,
}

/// An hour of the day with its 12-hour clock rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockHour {
    pub hour: u32,
    pub hour_12: u32,
    pub meridiem: Meridiem,
}

impl ClockHour {
    /// `hour` is 0-23. Midnight is 12 AM and noon is 12 PM.
    pub fn new(hour: u32) -> Self {
        let meridiem = if hour >= 12 { Meridiem::PM } else { Meridiem::AM };
        let hour_12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        Self {
            hour,
            hour_12,
            meridiem,
        }
    }
}

impl fmt::Display for ClockHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.hour_12, self.meridiem)
    }
}

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    pub common_month: u32,
    pub common_weekday: Weekday,
    pub common_hour: ClockHour,
}

impl TimeStats {
    pub fn month_name(&self) -> &'static str {
        month_name(self.common_month)
    }

    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.common_weekday)
    }
}

/// A start/end station pair taken from a single trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    pub start: String,
    pub end: String,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub common_start_station: String,
    pub common_end_station: String,
    pub common_route: Route,
}

/// Total and average trip length, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDurationStats {
    pub total_seconds: f64,
    pub mean_seconds: Result<f64, InsufficientData>,
}

/// A statistic that depends on an optional column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ColumnStat<T> {
    /// The dataset has no such column.
    Unsupported,
    Present(T),
}

impl<T> ColumnStat<T> {
    pub fn is_supported(&self) -> bool {
        matches!(self, ColumnStat::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            ColumnStat::Present(value) => Some(value),
            ColumnStat::Unsupported => None,
        }
    }
}

/// Earliest, most recent and most common rider birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearSummary {
    pub earliest: i32,
    pub latest: i32,
    pub most_common: i32,
}

/// Category counts, most frequent first.
pub type Counts = Vec<(String, usize)>;

/// Rider demographics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_type_counts: Counts,
    pub gender_counts: ColumnStat<Counts>,
    pub birth_year: ColumnStat<Result<BirthYearSummary, InsufficientData>>,
}

/// Every statistic group computed over one (possibly filtered) dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsResult {
    pub city: City,
    pub record_count: usize,
    pub time: Result<TimeStats, InsufficientData>,
    pub stations: Result<StationStats, InsufficientData>,
    pub duration: TripDurationStats,
    pub users: UserStats,
}
