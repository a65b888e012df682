//! OpenAQ City Collector
//!
//! Collects air-quality measurements for one city from the OpenAQ v3 API and
//! writes them to a CSV file.
//!
//! # Flow
//!
//! 1. List the locations of a country and keep those whose locality contains the city
//! 2. Walk every sensor of those locations through its paginated measurements
//! 3. Flatten the measurements into fixed-column rows and write them out
//!
//! Everything is configured through environment variables (see `config`).

mod config;
mod error;
mod model;
mod openaq;
mod output;

#[cfg(test)]
mod test_utils;

use crate::config::{CollectionConfig, OpenAqConfig, OutputConfig};
use crate::error::Result;
use crate::openaq::{CityCollector, Collection};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Application entry point.
///
/// Fails with a non-zero exit only when configuration or the API key cannot
/// be loaded. Collection problems are logged and the run still shuts down
/// cleanly.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_app_config().context("Failed to load AppConfig")?;
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .init();

    let (openaq_config, collection_config, output_config) =
        load_configs().context("Failed to load configuration")?;
    let api_key = config::read_api_key(&openaq_config.api_key_file)
        .context("Failed to load OpenAQ API key")?;
    let client =
        openaq::Client::new(openaq_config, api_key).context("Failed to build OpenAQ client")?;
    tracing::debug!("Using OpenAQ API at {}", client.base_url());
    let collector = CityCollector::new(client, collection_config.settings());

    let outcome = if collection_config.list_cities {
        list_cities(&collector, &collection_config).await
    } else {
        collect_and_write(&collector, &collection_config, &output_config)
            .await
            .map(|_| ())
    };
    if let Err(e) = outcome {
        tracing::error!("Collection failed: {:#}", anyhow::Error::from(e));
    }

    collector.close();
    tracing::info!("Finished.");
    Ok(())
}

fn load_configs() -> Result<(OpenAqConfig, CollectionConfig, OutputConfig)> {
    Ok((
        config::load_openaq_config()?,
        config::load_collection_config()?,
        config::load_output_config()?,
    ))
}

/// Logs the distinct localities of the configured country.
async fn list_cities(collector: &CityCollector, config: &CollectionConfig) -> Result<()> {
    let cities = collector
        .available_cities(&config.country_code, config.limit)
        .await?;
    tracing::info!(
        "{} cities available in {}: {}",
        cities.len(),
        config.country_code,
        cities.join(", ")
    );
    Ok(())
}

/// Runs one collection and writes its records, returning the CSV path if one was written.
async fn collect_and_write(
    collector: &CityCollector,
    config: &CollectionConfig,
    output_config: &OutputConfig,
) -> Result<Option<PathBuf>> {
    let query = config.query();
    let collection = collector.collect(&query).await?;
    write_collection(&collection, &query, output_config)
}

fn write_collection(
    collection: &Collection,
    query: &openaq::CityQuery,
    output_config: &OutputConfig,
) -> Result<Option<PathBuf>> {
    let report = match collection {
        Collection::NoMatchingLocations {
            available_localities,
        } => {
            tracing::warn!(
                "No locations found for city '{}'. Available localities: {}",
                query.city,
                available_localities.join(", ")
            );
            tracing::info!("No data collected.");
            return Ok(None);
        }
        Collection::Collected(report) => report,
    };

    for failure in &report.failed_sensors {
        tracing::warn!(
            sensor_id = failure.sensor_id,
            location_id = failure.location_id,
            "Sensor data is incomplete: {}",
            failure.error
        );
    }
    if report.records.is_empty() {
        tracing::info!("No data collected.");
        return Ok(None);
    }

    let path = output::output_path(&output_config.dir, query, Local::now());
    output::write_csv(&path, &report.records)?;

    tracing::info!(
        "Collected {} records from {} sensors at {} locations ({} pages)",
        report.records.len(),
        report.sensors,
        report.matched_locations,
        report.pages_fetched
    );
    match output::markdown_preview(&report.records, output_config.preview_rows) {
        Ok(preview) => tracing::info!("Preview:\n{}", preview),
        Err(e) => tracing::warn!("Unable to render preview: {}", e),
    }
    if let Some(stats) = model::value_stats(&report.records) {
        tracing::info!("Summary: {}", output::stats_summary(&stats));
    }

    Ok(Some(path))
}
