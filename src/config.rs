//! Location of the per-city trip logs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calendar::City;
use crate::error::{BikeshareError, Result};

const DEFAULT_DATA_DIR: &str = "data";

/// Maps each city to the CSV file holding its trips.
///
/// Stored as a JSON object on disk. Every key is optional:
/// ```json
/// {
///   "data_dir": "/srv/bikeshare",
///   "files": { "chicago": "chicago_2017.csv" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    files: HashMap<String, String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

impl DataConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            files: HashMap::new(),
        }
    }

    /// Uses `BIKESHARE_DATA_DIR` when set, otherwise `./data`.
    pub fn from_env() -> Self {
        std::env::var("BIKESHARE_DATA_DIR")
            .map(|dir| Self::new(dir))
            .unwrap_or_default()
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BikeshareError::DataSource {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DataConfig = serde_json::from_str(&content)
            .map_err(|e| BikeshareError::Config(format!("{}: {e}", path.display())))?;

        if let Some(unknown) = config.files.keys().find(|k| k.parse::<City>().is_err()) {
            return Err(BikeshareError::Config(format!(
                "{}: unknown city '{unknown}' in files",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Full path of the trip log for `city`.
    pub fn path_for(&self, city: City) -> PathBuf {
        let file_name = self
            .files
            .iter()
            .find(|(k, _)| k.parse::<City>().ok() == Some(city))
            .map(|(_, v)| v.as_str())
            .unwrap_or(city.file_name());
        self.data_dir.join(file_name)
    }
}
