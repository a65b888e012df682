//! City-scoped measurement collector.
//!
//! Walks a country's locations, keeps the ones whose locality contains the
//! requested city, then pages through every unique sensor's measurements
//! and flattens them into output records.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{ApiError, CollectorError};
use crate::model::{FlatMeasurement, Location, Measurement, Record, SensorDetail};
use crate::openaq::client::Client;
use crate::openaq::pagination::{Pagination, Paginator, PaginatorBuilder, StopReason};

/// What to collect.
#[derive(Debug, Clone, PartialEq)]
pub struct CityQuery {
    pub city: String,
    pub country_code: String,
    pub date_from: String,
    pub date_to: String,
    /// Locations listed for the country, and measurements per page
    pub limit: u32,
}

/// How to walk the API.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub empty_page_threshold: u32,
    pub max_pages: u32,
    pub page_pause: Duration,
    /// A courtesy pause is taken after every `batch_size` locations or sensors
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub latest_fallback: bool,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            empty_page_threshold: 3,
            max_pages: 1000,
            page_pause: Duration::from_secs(1),
            batch_size: 5,
            batch_pause: Duration::from_secs(5),
            latest_fallback: false,
        }
    }
}

/// A sensor whose pagination was cut short by a failed request.
#[derive(Debug)]
pub struct SensorFailure {
    pub sensor_id: i64,
    pub location_id: i64,
    pub error: ApiError,
}

/// Records gathered for the matched locations, with enough detail to tell
/// partial data from complete data.
#[derive(Debug, Default)]
pub struct CollectionReport {
    pub records: Vec<Record>,
    pub matched_locations: usize,
    pub sensors: usize,
    pub pages_fetched: u32,
    pub failed_sensors: Vec<SensorFailure>,
}

/// Outcome of a collection that reached the API successfully.
#[derive(Debug)]
pub enum Collection {
    /// No location's locality contains the city
    NoMatchingLocations { available_localities: Vec<String> },
    /// Locations matched; `records` may still be empty
    Collected(CollectionReport),
}

impl Collection {
    pub fn records(&self) -> &[Record] {
        match self {
            Collection::NoMatchingLocations { .. } => &[],
            Collection::Collected(report) => &report.records,
        }
    }
}

pub struct CityCollector {
    client: Client,
    settings: CollectorSettings,
}

impl CityCollector {
    pub fn new(client: Client, settings: CollectorSettings) -> Self {
        Self { client, settings }
    }

    /// Sorted, distinct locality names of a country's locations.
    pub async fn available_cities(
        &self,
        country_code: &str,
        limit: u32,
    ) -> Result<Vec<String>, CollectorError> {
        let locations = self
            .client
            .list_locations(country_code, limit)
            .await
            .map_err(|err| CollectorError::locations(country_code, err))?;
        Ok(localities(&locations))
    }

    /// Collects flattened measurements for every sensor in the matching locations.
    pub async fn collect(&self, query: &CityQuery) -> Result<Collection, CollectorError> {
        tracing::info!(
            "Getting data for {}, {} from {} to {}",
            query.city,
            query.country_code,
            query.date_from,
            query.date_to
        );

        let all_locations = self
            .client
            .list_locations(&query.country_code, query.limit)
            .await
            .map_err(|err| CollectorError::locations(&query.country_code, err))?;

        let matched: Vec<&Location> = all_locations
            .iter()
            .filter(|location| location.id.is_some() && location.locality_contains(&query.city))
            .collect();

        if matched.is_empty() {
            let available_localities = localities(&all_locations);
            tracing::warn!(
                "No locations found for '{}' in '{}'",
                query.city,
                query.country_code
            );
            tracing::info!(
                "Available cities in {} are: {:?}",
                query.country_code,
                available_localities
            );
            return Ok(Collection::NoMatchingLocations {
                available_localities,
            });
        }

        tracing::info!(
            "Found {} locations for '{}': {:?}",
            matched.len(),
            query.city,
            matched
                .iter()
                .map(|location| location.name.as_deref().unwrap_or("Unknown"))
                .collect::<Vec<_>>()
        );

        let sensors = unique_sensors(self.sensor_details(&matched).await);
        tracing::info!("Found {} sensors", sensors.len());

        let mut report = CollectionReport {
            matched_locations: matched.len(),
            sensors: sensors.len(),
            ..Default::default()
        };

        for (index, detail) in sensors.iter().enumerate() {
            tracing::info!(
                "Processing sensor {} of {}: {} (ID: {})",
                index + 1,
                sensors.len(),
                detail.location_name,
                detail.sensor_id
            );

            let pagination = self.paginate_sensor(detail, query)?.collect_all().await;
            report.pages_fetched += pagination.pages_fetched;
            let rows = self.sensor_rows(detail, query, pagination, &mut report).await;

            let data_gap: i64 = rows.iter().filter_map(FlatMeasurement::data_gap).sum();
            tracing::debug!(
                sensor_id = detail.sensor_id,
                rows = rows.len(),
                data_gap,
                "Sensor done"
            );
            report
                .records
                .extend(rows.into_iter().map(FlatMeasurement::into_record));

            self.courtesy_pause(index, sensors.len()).await;
        }

        tracing::info!("Retrieved {} measurements", report.records.len());
        if !report.failed_sensors.is_empty() {
            tracing::warn!(
                "{} of {} sensors failed and may be incomplete",
                report.failed_sensors.len(),
                report.sensors
            );
        }

        Ok(Collection::Collected(report))
    }

    /// Records metadata for every named-parameter sensor of the matched locations.
    async fn sensor_details(&self, locations: &[&Location]) -> Vec<SensorDetail> {
        let mut details = Vec::new();

        for (index, location) in locations.iter().enumerate() {
            tracing::info!(
                "{} has {} sensors",
                location.name.as_deref().unwrap_or("Unknown"),
                location.sensors.len()
            );
            for sensor in &location.sensors {
                match SensorDetail::from_sensor(location, sensor) {
                    Some(detail) => {
                        tracing::debug!(
                            sensor_id = ?sensor.id,
                            parameter = %detail.parameter,
                            "Sensor recorded"
                        );
                        details.push(detail);
                    }
                    None => tracing::debug!(sensor_id = ?sensor.id, "Sensor skipped: no id or parameter name"),
                }
            }

            self.courtesy_pause(index, locations.len()).await;
        }

        details
    }

    fn paginate_sensor<'a>(
        &'a self,
        detail: &SensorDetail,
        query: &'a CityQuery,
    ) -> Result<Paginator<'a, Measurement>, CollectorError> {
        let client = &self.client;
        let sensor_id = detail.sensor_id;

        PaginatorBuilder::new()
            .max_pages(self.settings.max_pages)
            .empty_page_threshold(self.settings.empty_page_threshold)
            .page_pause(self.settings.page_pause)
            .fetch_with(move |page| {
                Box::pin(client.list_measurements(
                    sensor_id,
                    &query.date_from,
                    &query.date_to,
                    query.limit,
                    page,
                ))
            })
            .build()
    }

    /// Flattens a sensor's pages, recording a failure or falling back to the latest snapshot.
    async fn sensor_rows(
        &self,
        detail: &SensorDetail,
        query: &CityQuery,
        pagination: Pagination<Measurement>,
        report: &mut CollectionReport,
    ) -> Vec<FlatMeasurement> {
        let rows: Vec<FlatMeasurement> = pagination
            .items
            .iter()
            .map(|measurement| FlatMeasurement::flatten(measurement, detail))
            .collect();

        match pagination.stop {
            StopReason::Failed(error) => {
                tracing::error!(
                    sensor_id = detail.sensor_id,
                    pages = pagination.pages_fetched,
                    "Error fetching measurements: {}",
                    error
                );
                report.failed_sensors.push(SensorFailure {
                    sensor_id: detail.sensor_id,
                    location_id: detail.location_id,
                    error,
                });
                rows
            }
            StopReason::EmptyPages if rows.is_empty() && self.settings.latest_fallback => {
                self.latest_snapshot(detail, query).await
            }
            StopReason::EmptyPages => rows,
            StopReason::PageCap => {
                tracing::warn!(
                    sensor_id = detail.sensor_id,
                    "Stopped at the {} page cap; later measurements were not fetched",
                    self.settings.max_pages
                );
                rows
            }
        }
    }

    async fn latest_snapshot(&self, detail: &SensorDetail, query: &CityQuery) -> Vec<FlatMeasurement> {
        tracing::info!(
            sensor_id = detail.sensor_id,
            location_id = detail.location_id,
            "No measurements in range, fetching latest snapshot"
        );
        match self
            .client
            .latest_for_location(detail.location_id, query.limit)
            .await
        {
            Ok(readings) => readings
                .iter()
                .filter(|reading| reading.sensors_id == Some(detail.sensor_id))
                .map(|reading| FlatMeasurement::from_latest(reading, detail))
                .collect(),
            Err(err) => {
                tracing::warn!(
                    location_id = detail.location_id,
                    "Latest snapshot unavailable: {}",
                    err
                );
                Vec::new()
            }
        }
    }

    async fn courtesy_pause(&self, index: usize, total: usize) {
        let done = index + 1;
        let batch = self.settings.batch_size;
        if batch == 0 || done % batch != 0 || done >= total || self.settings.batch_pause.is_zero() {
            return;
        }
        tracing::info!("Taking a brief pause...");
        sleep(self.settings.batch_pause).await;
    }

    /// Releases the HTTP session.
    pub fn close(self) {
        self.client.close();
    }
}

/// Distinct, sorted, non-empty localities.
fn localities(locations: &[Location]) -> Vec<String> {
    locations
        .iter()
        .filter_map(|location| location.locality.clone())
        .filter(|locality| !locality.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Deduplicates by sensor id in first-seen order; the last detail seen for an id wins.
fn unique_sensors(details: Vec<SensorDetail>) -> Vec<SensorDetail> {
    let mut order = Vec::new();
    let mut by_id: HashMap<i64, SensorDetail> = HashMap::new();

    for detail in details {
        let sensor_id = detail.sensor_id;
        if by_id.insert(sensor_id, detail).is_none() {
            order.push(sensor_id);
        }
    }

    order
        .into_iter()
        .filter_map(|sensor_id| by_id.remove(&sensor_id))
        .collect()
}
