//! Loads a city's trip log into memory.
//!
//! Every record's start time is parsed up front and the calendar fields the
//! filters look at (month, weekday, hour) are derived once at load time.

use std::fs::File;
use std::io::Read;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{City, weekday_name};
use crate::config::DataConfig;
use crate::error::{BikeshareError, Result};

const GENDER_COLUMN: &str = "Gender";
const BIRTH_YEAR_COLUMN: &str = "Birth Year";

/// Columns every trip log must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Start Time",
    "End Time",
    "Trip Duration",
    "Start Station",
    "End Station",
    "User Type",
];

/// Timestamp layouts accepted for `Start Time` and `End Time`.
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A single row as it appears in the CSV file.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type")]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

/// One bike rental.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    trip_duration: f64,
    start_station: String,
    end_station: String,
    user_type: Option<String>,
    gender: Option<String>,
    birth_year: Option<f64>,

    // derived from start_time
    month: u32,
    day_of_week: Weekday,
    hour: u32,
}

impl TripRecord {
    pub fn new(
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        trip_duration: f64,
        start_station: &str,
        end_station: &str,
        user_type: &str,
    ) -> Self {
        TripRecord {
            start_time,
            end_time,
            trip_duration,
            start_station: start_station.to_string(),
            end_station: end_station.to_string(),
            user_type: Some(user_type.to_string()).filter(|u| !u.is_empty()),
            gender: None,
            birth_year: None,
            month: start_time.month(),
            day_of_week: start_time.weekday(),
            hour: start_time.hour(),
        }
    }

    /// Set the rider's gender.
    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = Some(gender.to_string());
        self
    }

    /// Set the rider's birth year as stored in the source (possibly fractional).
    pub fn with_birth_year(mut self, birth_year: f64) -> Self {
        self.birth_year = Some(birth_year);
        self
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    /// Trip length in seconds as recorded by the operator.
    pub fn trip_duration(&self) -> f64 {
        self.trip_duration
    }

    pub fn start_station(&self) -> &str {
        &self.start_station
    }

    pub fn end_station(&self) -> &str {
        &self.end_station
    }

    pub fn user_type(&self) -> Option<&str> {
        self.user_type.as_deref()
    }

    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    pub fn birth_year(&self) -> Option<f64> {
        self.birth_year
    }

    /// Month of the start time, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    /// Full weekday name of the start time.
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }

    /// Hour of the start time, 0-23.
    pub fn hour(&self) -> u32 {
        self.hour
    }
}

/// All trips for one city, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    city: City,
    records: Vec<TripRecord>,
    has_gender: bool,
    has_birth_year: bool,
}

impl Dataset {
    pub fn new(city: City, records: Vec<TripRecord>, has_gender: bool, has_birth_year: bool) -> Self {
        Dataset {
            city,
            records,
            has_gender,
            has_birth_year,
        }
    }

    /// A dataset carrying this one's city and column capabilities but other records.
    pub fn with_records(&self, records: Vec<TripRecord>) -> Self {
        Dataset::new(self.city, records, self.has_gender, self.has_birth_year)
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source file has a `Gender` column.
    pub fn has_gender(&self) -> bool {
        self.has_gender
    }

    /// Whether the source file has a `Birth Year` column.
    pub fn has_birth_year(&self) -> bool {
        self.has_birth_year
    }
}

/// Loads the trip log for `city` from the location given by `config`.
///
/// # Errors
///
/// Returns [`BikeshareError::DataSource`] if the file cannot be opened,
/// [`BikeshareError::MissingColumn`] if a column in [`REQUIRED_COLUMNS`] is absent,
/// [`BikeshareError::Csv`] if a row is not valid CSV or a field fails to decode,
/// and [`BikeshareError::MalformedTimestamp`] on the first unparseable time.
#[tracing::instrument(skip_all, fields(city = %city))]
pub fn load(city: City, config: &DataConfig) -> Result<Dataset> {
    let path = config.path_for(city);
    let file = File::open(&path).map_err(|source| BikeshareError::DataSource {
        path: path.clone(),
        source,
    })?;

    let dataset = load_from_reader(city, file)?;
    info!(
        path = %path.display(),
        records = dataset.len(),
        has_gender = dataset.has_gender,
        has_birth_year = dataset.has_birth_year,
        "Trip data loaded"
    );
    Ok(dataset)
}

/// Reads a trip log in CSV form from any reader.
pub fn load_from_reader<R: Read>(city: City, reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(BikeshareError::MissingColumn(missing));
    }
    let has_gender = headers.iter().any(|h| h == GENDER_COLUMN);
    let has_birth_year = headers.iter().any(|h| h == BIRTH_YEAR_COLUMN);
    debug!(columns = headers.len(), has_gender, has_birth_year, "CSV header inspected");

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());
        let raw: RawTrip = row.deserialize(Some(&headers))?;
        records.push(raw.into_record(line)?);
    }

    Ok(Dataset::new(city, records, has_gender, has_birth_year))
}

impl RawTrip {
    fn into_record(self, line: u64) -> Result<TripRecord> {
        let start_time = parse_timestamp(&self.start_time, line)?;
        let end_time = parse_timestamp(&self.end_time, line)?;

        let mut record = TripRecord::new(
            start_time,
            end_time,
            self.trip_duration,
            &self.start_station,
            &self.end_station,
            self.user_type.as_deref().unwrap_or(""),
        );
        record.gender = self.gender.filter(|g| !g.is_empty());
        record.birth_year = self.birth_year;
        Ok(record)
    }
}

/// Parses a trip timestamp using the first matching layout in [`TIMESTAMP_FORMATS`].
pub fn parse_timestamp(value: &str, line: u64) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| BikeshareError::MalformedTimestamp {
            line,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Customer,,
";

    const NO_DEMOGRAPHICS_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
";

    #[test]
    fn test_load_derives_calendar_fields() {
        let dataset = load_from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3);
        let first = &dataset.records()[0];
        assert_eq!(first.month(), 6);
        assert_eq!(first.day_of_week(), Weekday::Fri);
        assert_eq!(first.day_name(), "Friday");
        assert_eq!(first.hour(), 15);
        assert_eq!(first.trip_duration(), 321.0);
        assert_eq!(first.start_station(), "Wood St & Hubbard St");
    }

    #[test]
    fn test_load_detects_optional_columns() {
        let full = load_from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        assert!(full.has_gender());
        assert!(full.has_birth_year());

        let bare = load_from_reader(City::Washington, NO_DEMOGRAPHICS_CSV.as_bytes()).unwrap();
        assert!(!bare.has_gender());
        assert!(!bare.has_birth_year());
        assert_eq!(bare.records()[0].gender(), None);
        assert_eq!(bare.records()[0].trip_duration(), 489.066);
    }

    #[test]
    fn test_load_blank_optional_values_are_none() {
        let dataset = load_from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        let customer = &dataset.records()[2];

        assert_eq!(customer.user_type(), Some("Customer"));
        assert_eq!(customer.gender(), None);
        assert_eq!(customer.birth_year(), None);
        assert_eq!(dataset.records()[0].birth_year(), Some(1992.0));
    }

    #[test]
    fn test_load_malformed_timestamp_fails_whole_load() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-01-01 00:00:01,2017-01-01 00:10:01,600,A,B,Subscriber
not a time,2017-01-01 00:10:01,600,A,B,Subscriber
";
        let err = load_from_reader(City::Chicago, csv.as_bytes()).unwrap_err();
        match err {
            BikeshareError::MalformedTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not a time");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_bad_duration_is_data_source_error() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-01-01 00:00:01,2017-01-01 00:10:01,ten minutes,A,B,Subscriber
";
        let err = load_from_reader(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(err.is_data_source());
    }

    #[test]
    fn test_load_without_user_type_column_fails() {
        let csv = "\
Start Time,End Time,Trip Duration,Start Station,End Station
2017-01-01 00:00:01,2017-01-01 00:10:01,600,A,B
";
        let err = load_from_reader(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(err.is_data_source());
        assert!(matches!(err, BikeshareError::MissingColumn("User Type")));
    }

    #[test]
    fn test_load_header_only_still_checks_columns() {
        let err = load_from_reader(City::Chicago, "Start Time,End Time\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BikeshareError::MissingColumn("Trip Duration")));
    }

    #[test]
    fn test_load_missing_file() {
        let config = DataConfig::new("/nonexistent/dir");
        let err = load(City::Chicago, &config).unwrap_err();
        assert!(matches!(err, BikeshareError::DataSource { .. }));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2017-01-01 09:07:57", 1).is_ok());
        assert!(parse_timestamp("2017-01-01T09:07:57", 1).is_ok());
        assert!(parse_timestamp("2017-01-01 09:07:57.250", 1).is_ok());
        assert!(parse_timestamp("01/31/2017 23:59", 1).is_ok());
        assert!(parse_timestamp("2017-13-01 09:07:57", 1).is_err());
    }

    #[test]
    fn test_with_records_keeps_capabilities() {
        let dataset = load_from_reader(City::Chicago, FULL_CSV.as_bytes()).unwrap();
        let empty = dataset.with_records(Vec::new());

        assert!(empty.is_empty());
        assert_eq!(empty.city(), City::Chicago);
        assert!(empty.has_gender());
        assert!(empty.has_birth_year());
    }
}
