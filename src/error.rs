//! Error types for loading and summarizing trip data.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A statistic that has no defined value over the records it was asked about.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("not enough data to compute {statistic}")]
pub struct InsufficientData {
    pub statistic: &'static str,
}

impl InsufficientData {
    pub fn new(statistic: &'static str) -> Self {
        Self { statistic }
    }
}

#[derive(Error, Debug)]
pub enum BikeshareError {
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Failed to read data file: {path}")]
    DataSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed timestamp on line {line}: {value:?}")]
    MalformedTimestamp { line: u64, value: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BikeshareError {
    /// Returns `true` for failures reading or decoding the underlying data file.
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            BikeshareError::DataSource { .. }
                | BikeshareError::Csv(_)
                | BikeshareError::MissingColumn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BikeshareError>;
