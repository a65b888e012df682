use crate::error::ConfigError;
use crate::openaq::{CityQuery, CollectorSettings};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Loads a config struct from environment variables sharing `prefix`.
fn load_prefixed<T: DeserializeOwned>(prefix: &str) -> Result<T, ConfigError> {
    envy::prefixed(prefix)
        .from_env::<T>()
        .map_err(|err| match err {
            envy::Error::MissingValue(field) => {
                ConfigError::missing(format!("{}{}", prefix, field.to_uppercase()))
            }
            other => ConfigError::env_parse(other),
        })
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub(crate) fn load_app_config() -> Result<AppConfig, ConfigError> {
    load_prefixed("")
}

fn default_openaq_url() -> String {
    "https://api.openaq.org".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct OpenAqConfig {
    #[serde(default = "default_openaq_url")]
    pub url: String,
    pub api_key_file: PathBuf,
}

pub(crate) fn load_openaq_config() -> Result<OpenAqConfig, ConfigError> {
    load_prefixed("OPENAQ_")
}

/// Reads the API key from `path`, trimming surrounding whitespace.
pub fn read_api_key(path: &Path) -> Result<String, ConfigError> {
    let display = path.display().to_string();
    let contents =
        std::fs::read_to_string(path).map_err(|err| ConfigError::credentials(&display, err))?;
    let key = contents.trim();
    if key.is_empty() {
        return Err(ConfigError::credentials(display, "file is empty"));
    }
    Ok(key.to_string())
}

fn default_limit() -> u32 {
    100
}

fn default_empty_page_threshold() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    1000
}

fn default_page_pause_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_pause_ms() -> u64 {
    5000
}

#[derive(Deserialize, Debug, Clone)]
pub struct CollectionConfig {
    pub city: String,
    pub country_code: String,
    pub date_from: String,
    pub date_to: String,
    // locations listed per country, and measurements requested per page
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_empty_page_threshold")]
    pub empty_page_threshold: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_page_pause_ms")]
    pub page_pause_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
    #[serde(default)]
    pub latest_fallback: bool,
    #[serde(default)]
    pub list_cities: bool,
}

impl CollectionConfig {
    /// Checks that the date window parses and is ordered, and that the limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.city.is_empty() {
            return Err(ConfigError::invalid("city", "must not be empty"));
        }
        if self.limit == 0 {
            return Err(ConfigError::invalid("limit", "must be at least 1"));
        }
        let from = parse_date_bound("date_from", &self.date_from)?;
        let to = parse_date_bound("date_to", &self.date_to)?;
        if from > to {
            return Err(ConfigError::invalid(
                "date_from",
                format!("{} is after date_to {}", self.date_from, self.date_to),
            ));
        }
        Ok(())
    }

    pub fn query(&self) -> CityQuery {
        CityQuery {
            city: self.city.clone(),
            country_code: self.country_code.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            limit: self.limit,
        }
    }

    pub fn settings(&self) -> CollectorSettings {
        CollectorSettings {
            empty_page_threshold: self.empty_page_threshold,
            max_pages: self.max_pages,
            page_pause: Duration::from_millis(self.page_pause_ms),
            batch_size: self.batch_size,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
            latest_fallback: self.latest_fallback,
        }
    }
}

/// Accepts either a plain `YYYY-MM-DD` date (midnight) or an RFC 3339 timestamp.
fn parse_date_bound(field: &str, value: &str) -> Result<NaiveDateTime, ConfigError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .map_err(|err| ConfigError::invalid(field, format!("'{}' is not a date: {}", value, err)))
}

pub(crate) fn load_collection_config() -> Result<CollectionConfig, ConfigError> {
    let config: CollectionConfig = load_prefixed("COLLECTION_")?;
    config.validate()?;
    Ok(config)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_preview_rows() -> usize {
    10
}

#[derive(Deserialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

pub(crate) fn load_output_config() -> Result<OutputConfig, ConfigError> {
    load_prefixed("OUTPUT_")
}
