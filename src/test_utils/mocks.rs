//! Mock server helpers for testing.
//!
//! `MockOpenAqServer` wraps a wiremock server and mounts the OpenAQ v3
//! endpoints the collector calls. Expectations set here are verified when
//! the server is dropped.

use serde_json::Value;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::json::{latest_page, measurements_page};

/// API key the collector tests configure their client with.
pub const TEST_API_KEY: &str = "test-key";

/// Fake OpenAQ API backed by wiremock.
pub struct MockOpenAqServer {
    server: MockServer,
}

impl MockOpenAqServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Gets the server URL.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Serves `body` for the location listing of `country_code`.
    pub async fn mock_locations(&self, country_code: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v3/locations"))
            .and(query_param("iso", country_code))
            .and(header("X-API-Key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_locations_status(&self, country_code: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/v3/locations"))
            .and(query_param("iso", country_code))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
            .mount(&self.server)
            .await;
    }

    /// Serves `pages[i]` measurements for page `i + 1`, each requested exactly once.
    ///
    /// Any later page answers with an empty result set.
    pub async fn mock_measurement_pages(&self, sensor_id: i64, pages: &[usize]) {
        self.mount_measurement_pages(sensor_id, pages, Some(1)).await;
    }

    /// Same as [`Self::mock_measurement_pages`] without request count expectations.
    pub async fn mock_measurement_pages_repeatable(&self, sensor_id: i64, pages: &[usize]) {
        self.mount_measurement_pages(sensor_id, pages, None).await;
    }

    async fn mount_measurement_pages(&self, sensor_id: i64, pages: &[usize], times: Option<u64>) {
        let endpoint = format!("/v3/sensors/{}/measurements", sensor_id);
        let mut offset = 0;

        for (index, count) in pages.iter().enumerate() {
            let mock = Mock::given(method("GET"))
                .and(path(endpoint.as_str()))
                .and(query_param("page", (index + 1).to_string()))
                .and(header("X-API-Key", TEST_API_KEY))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(measurements_page(*count, offset)),
                );
            let mock = match times {
                Some(times) => mock.expect(times),
                None => mock,
            };
            mock.mount(&self.server).await;
            offset += count;
        }

        Mock::given(method("GET"))
            .and(path(endpoint.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(measurements_page(0, 0)))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    /// Fails the test if any measurement page of `sensor_id` is requested.
    pub async fn expect_no_measurements(&self, sensor_id: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/v3/sensors/{}/measurements", sensor_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(measurements_page(0, 0)))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Serves `body` for page 1 of `sensor_id`; later pages are empty.
    pub async fn mock_measurements_body(&self, sensor_id: i64, body: Value) {
        let endpoint = format!("/v3/sensors/{}/measurements", sensor_id);
        Mock::given(method("GET"))
            .and(path(endpoint.as_str()))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(endpoint.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(measurements_page(0, 0)))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_measurements_status(&self, sensor_id: i64, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/v3/sensors/{}/measurements", sensor_id)))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
            .mount(&self.server)
            .await;
    }

    /// Serves latest readings for `location_id`, one per `(sensor_id, value)`.
    pub async fn mock_latest(&self, location_id: i64, readings: &[(i64, f64)]) {
        Mock::given(method("GET"))
            .and(path(format!("/v3/locations/{}/latest", location_id)))
            .and(header("X-API-Key", TEST_API_KEY))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(latest_page(location_id, readings)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_latest_status(&self, location_id: i64, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/v3/locations/{}/latest", location_id)))
            .respond_with(ResponseTemplate::new(status).set_body_string("unavailable"))
            .mount(&self.server)
            .await;
    }
}
