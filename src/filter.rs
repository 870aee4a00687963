//! Month and weekday restrictions applied before aggregation.

use std::fmt;

use chrono::Weekday;
use serde::Serialize;

use crate::calendar::{Month, parse_weekday, weekday_name};
use crate::store::{Dataset, TripRecord};

/// Optional month and day restrictions. `None` leaves that axis unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub month: Option<Month>,
    pub day: Option<Weekday>,
}

impl FilterSpec {
    pub fn new(month: Option<Month>, day: Option<Weekday>) -> Self {
        Self { month, day }
    }

    /// No restriction on either axis.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a spec from user-entered text. Blank or `"all"` means no restriction.
    pub fn parse(month: &str, day: &str) -> Result<Self, String> {
        let month = if is_unrestricted(month) {
            None
        } else {
            Some(month.parse::<Month>()?)
        };
        let day = if is_unrestricted(day) {
            None
        } else {
            Some(parse_weekday(day)?)
        };
        Ok(Self { month, day })
    }

    pub fn matches(&self, record: &TripRecord) -> bool {
        self.month.is_none_or(|m| record.month() == m.number())
            && self.day.is_none_or(|d| record.day_of_week() == d)
    }
}

fn is_unrestricted(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = self.month.map_or("all months", |m| m.name());
        let day = self.day.map_or("all days", weekday_name);
        write!(f, "{month}, {day}")
    }
}

/// Returns the records of `dataset` matching `spec`, in their original order.
///
/// The result may be empty. `dataset` is left untouched.
#[tracing::instrument(skip_all, fields(spec = %spec, input = dataset.len()))]
pub fn filter(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let kept: Vec<TripRecord> = dataset
        .records()
        .iter()
        .filter(|r| spec.matches(r))
        .cloned()
        .collect();
    tracing::debug!(kept = kept.len(), "Filter applied");
    dataset.with_records(kept)
}
