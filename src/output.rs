//! Output formatting for trip statistics and raw data pages.
//!
//! Supports a plain-text report, pretty JSON and debug logging.

use std::fmt;

use anyhow::Result;
use tracing::debug;

use crate::filter::FilterSpec;
use crate::stats::{Counts, StatisticsResult};
use crate::store::TripRecord;

const RULE: &str = "----------------------------------------";

/// Logs statistics using Rust's debug pretty-print format.
pub fn print_pretty(result: &StatisticsResult) {
    debug!("{:#?}", result);
}

/// Serializes statistics as pretty-printed JSON.
pub fn to_json(result: &StatisticsResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Renders a number of seconds as days, hours, minutes and seconds.
pub fn format_duration(total_seconds: f64) -> String {
    let whole = total_seconds.max(0.0).trunc() as u64;
    let fraction = total_seconds.max(0.0).fract();
    let days = whole / 86_400;
    let hours = whole % 86_400 / 3_600;
    let minutes = whole % 3_600 / 60;
    let seconds = (whole % 60) as f64 + fraction;

    let seconds = if fraction == 0.0 {
        format!("{seconds:.0}")
    } else {
        format!("{seconds:.3}")
    };
    format!("{days} days, {hours} hours, {minutes} minutes, {seconds} seconds")
}

/// The four-section text report shown after a query.
pub struct Report<'a> {
    pub result: &'a StatisticsResult,
    pub spec: &'a FilterSpec,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        writeln!(f, "City: {}", result.city)?;
        writeln!(f, "Filter: {}", self.spec)?;
        writeln!(f, "Trips: {}", result.record_count)?;
        writeln!(f, "{RULE}")?;

        writeln!(f, "\nThe Most Frequent Times of Travel\n")?;
        match &result.time {
            Ok(time) => {
                writeln!(f, "Most common month: {}", time.month_name())?;
                writeln!(f, "Most common day of the week: {}", time.weekday_name())?;
                writeln!(f, "Most common start hour: {}", time.common_hour)?;
            }
            Err(e) => writeln!(f, "Unavailable: {e}")?,
        }
        writeln!(f, "{RULE}")?;

        writeln!(f, "\nThe Most Popular Stations and Trip\n")?;
        match &result.stations {
            Ok(stations) => {
                writeln!(f, "Most common start station: {}", stations.common_start_station)?;
                writeln!(f, "Most common end station: {}", stations.common_end_station)?;
                writeln!(
                    f,
                    "Most common trip: {} --> {}",
                    stations.common_route.start, stations.common_route.end
                )?;
            }
            Err(e) => writeln!(f, "Unavailable: {e}")?,
        }
        writeln!(f, "{RULE}")?;

        writeln!(f, "\nTrip Duration\n")?;
        writeln!(
            f,
            "Total travel time: {}",
            format_duration(result.duration.total_seconds)
        )?;
        match result.duration.mean_seconds {
            Ok(mean) => writeln!(f, "Mean travel time: {mean:.2} seconds")?,
            Err(e) => writeln!(f, "Mean travel time unavailable: {e}")?,
        }
        writeln!(f, "{RULE}")?;

        writeln!(f, "\nUser Stats\n")?;
        writeln!(f, "Counts of user types:")?;
        write_counts(f, &result.users.user_type_counts)?;

        match result.users.gender_counts.as_present() {
            Some(counts) => {
                writeln!(f, "\nCounts of gender:")?;
                write_counts(f, counts)?;
            }
            None => writeln!(f, "\nNo gender data for this city")?,
        }

        match result.users.birth_year.as_present() {
            Some(Ok(years)) => {
                writeln!(f, "\nEarliest year of birth: {}", years.earliest)?;
                writeln!(f, "Most recent year of birth: {}", years.latest)?;
                writeln!(f, "Most common year of birth: {}", years.most_common)?;
            }
            Some(Err(e)) => writeln!(f, "\nBirth year unavailable: {e}")?,
            None => writeln!(f, "\nNo birth year data for this city")?,
        }
        writeln!(f, "{RULE}")
    }
}

/// Builds the text report for `result`.
pub fn render_report(result: &StatisticsResult, spec: &FilterSpec) -> String {
    Report { result, spec }.to_string()
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &Counts) -> fmt::Result {
    if counts.is_empty() {
        writeln!(f, "  (none)")?;
    }
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, count) in counts {
        writeln!(f, "  {name:<width$}  {count}")?;
    }
    Ok(())
}

/// One page of raw records, numbered from `offset`.
pub struct RawPage<'a> {
    pub records: &'a [TripRecord],
    pub offset: usize,
}

impl fmt::Display for RawPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.records.iter().enumerate() {
            write!(
                f,
                "[{}] {} -> {} | {}s | {} -> {} | {}",
                self.offset + i,
                r.start_time(),
                r.end_time(),
                r.trip_duration(),
                r.start_station(),
                r.end_station(),
                r.user_type().unwrap_or("-"),
            )?;
            if let Some(gender) = r.gender() {
                write!(f, " | {gender}")?;
            }
            if let Some(year) = r.birth_year() {
                write!(f, " | born {}", year.trunc() as i32)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders one page of raw records, numbering rows from `offset`.
pub fn render_page(records: &[TripRecord], offset: usize) -> String {
    RawPage { records, offset }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::City;
    use crate::stats::summarize;
    use crate::store::Dataset;
    use chrono::NaiveDate;

    fn trip(h: u32, seconds: f64) -> TripRecord {
        let t = NaiveDate::from_ymd_opt(2017, 6, 5)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        TripRecord::new(t, t, seconds, "Lake Shore Dr", "Millennium Park", "Customer")
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0 days, 0 hours, 0 minutes, 0 seconds");
        assert_eq!(
            format_duration(90_061.0),
            "1 days, 1 hours, 1 minutes, 1 seconds"
        );
        assert_eq!(
            format_duration(61.5),
            "0 days, 0 hours, 1 minutes, 1.500 seconds"
        );
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let dataset = Dataset::new(City::Chicago, vec![trip(9, 60.0)], true, true);
        print_pretty(&summarize(&dataset));
    }

    #[test]
    fn test_to_json_round_trips_as_value() {
        let dataset = Dataset::new(City::Chicago, vec![trip(9, 60.0)], true, true);
        let json = to_json(&summarize(&dataset)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["duration"]["total_seconds"], 60.0);
    }

    #[test]
    fn test_report_sections() {
        let dataset = Dataset::new(City::Washington, vec![trip(13, 60.0), trip(13, 120.0)], false, false);
        let report = render_report(&summarize(&dataset), &FilterSpec::all());

        assert!(report.contains("City: Washington"));
        assert!(report.contains("Most common month: June"));
        assert!(report.contains("Most common day of the week: Monday"));
        assert!(report.contains("Most common start hour: 1 PM"));
        assert!(report.contains("Most common trip: Lake Shore Dr --> Millennium Park"));
        assert!(report.contains("Mean travel time: 90.00 seconds"));
        assert!(report.contains("No gender data for this city"));
        assert!(report.contains("No birth year data for this city"));
    }

    #[test]
    fn test_report_lists_gender_and_birth_years() {
        let records = vec![
            trip(9, 60.0).with_gender("Female").with_birth_year(1990.0),
            trip(9, 60.0).with_gender("Male").with_birth_year(1975.0),
            trip(9, 60.0).with_gender("Female").with_birth_year(1990.0),
        ];
        let dataset = Dataset::new(City::Chicago, records, true, true);
        let report = render_report(&summarize(&dataset), &FilterSpec::all());

        assert!(report.contains("Counts of gender:\n  Female  2\n  Male    1\n"));
        assert!(report.contains("Earliest year of birth: 1975"));
        assert!(report.contains("Most common year of birth: 1990"));
    }

    #[test]
    fn test_report_on_empty_input() {
        let dataset = Dataset::new(City::Chicago, Vec::new(), true, true);
        let report = render_report(&summarize(&dataset), &FilterSpec::all());

        assert!(report.contains("Unavailable: not enough data to compute most common month"));
        assert!(report.contains("Total travel time: 0 days, 0 hours, 0 minutes, 0 seconds"));
        assert!(report.contains("Mean travel time unavailable"));
        assert!(report.contains("Birth year unavailable"));
    }

    #[test]
    fn test_render_page_numbers_rows() {
        let records = vec![trip(8, 60.0).with_gender("Male").with_birth_year(1984.0)];
        let page = render_page(&records, 10);
        assert!(page.starts_with("[10] 2017-06-05 08:00:00"));
        assert!(page.contains("| Male | born 1984"));
    }
}
