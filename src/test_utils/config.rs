//! Configuration utilities for testing.
//!
//! Builders for the env-loaded configuration structs, plus collector
//! settings with every pause disabled so tests run instantly.

use crate::config::{CollectionConfig, OpenAqConfig};
use crate::openaq::CollectorSettings;
use std::path::PathBuf;
use std::time::Duration;

/// Builder for creating test OpenAQ configurations.
#[derive(Debug)]
pub struct TestOpenAqConfigBuilder {
    url: String,
    api_key_file: PathBuf,
}

impl TestOpenAqConfigBuilder {
    /// Creates a new test config builder with default values.
    pub fn new() -> Self {
        Self {
            url: "http://test.local".to_string(),
            api_key_file: PathBuf::from("/tmp/openaq_key.txt"),
        }
    }

    /// Sets the URL for the test configuration.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builds the OpenAQ configuration.
    pub fn build(self) -> OpenAqConfig {
        OpenAqConfig {
            url: self.url,
            api_key_file: self.api_key_file,
        }
    }
}

/// Builder for creating test collection configurations.
#[derive(Debug)]
pub struct TestCollectionConfigBuilder {
    config: CollectionConfig,
}

impl TestCollectionConfigBuilder {
    /// Creates a new builder for a Springfield, US query over 2024.
    pub fn new() -> Self {
        Self {
            config: CollectionConfig {
                city: "Springfield".to_string(),
                country_code: "US".to_string(),
                date_from: "2024-01-01".to_string(),
                date_to: "2024-12-31".to_string(),
                limit: 100,
                empty_page_threshold: 3,
                max_pages: 1000,
                page_pause_ms: 0,
                batch_size: 5,
                batch_pause_ms: 0,
                latest_fallback: false,
                list_cities: false,
            },
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.config.city = city.into();
        self
    }

    pub fn with_dates(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.date_from = from.into();
        self.config.date_to = to.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.config.limit = limit;
        self
    }

    pub fn build(self) -> CollectionConfig {
        self.config
    }
}

/// Creates a test OpenAQ configuration with a custom URL.
/// This is a convenience function for tests that need to specify a mock server URL.
pub fn test_openaq_config_with_url(url: impl Into<String>) -> OpenAqConfig {
    TestOpenAqConfigBuilder::new().with_url(url).build()
}

/// Collector settings matching the defaults, minus every pause.
pub fn test_collector_settings() -> CollectorSettings {
    CollectorSettings {
        page_pause: Duration::ZERO,
        batch_pause: Duration::ZERO,
        ..CollectorSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openaq_config_builder() {
        let config = TestOpenAqConfigBuilder::new()
            .with_url("http://custom.local")
            .build();

        assert_eq!(config.url, "http://custom.local");
        assert_eq!(config.api_key_file, PathBuf::from("/tmp/openaq_key.txt"));
    }

    #[test]
    fn test_collection_config_builder_is_valid() {
        let config = TestCollectionConfigBuilder::new().build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_collector_settings_have_no_pauses() {
        let settings = test_collector_settings();
        assert!(settings.page_pause.is_zero());
        assert!(settings.batch_pause.is_zero());
        assert_eq!(settings.empty_page_threshold, 3);
        assert_eq!(settings.max_pages, 1000);
    }
}
