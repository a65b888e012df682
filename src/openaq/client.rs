use crate::config;
use crate::error::ApiError;
use crate::model::{LatestReading, Location, Measurement, Page};
use crate::openaq::query_builder::{QueryBuilder, QueryType};
use reqwest::header::RETRY_AFTER;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct Client {
    http_client: HttpClient,
    config: config::OpenAqConfig,
    api_key: String,
}

impl Client {
    pub fn new(config: config::OpenAqConfig, api_key: String) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.url
    }

    /// Sends an authenticated GET and decodes the JSON body into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.config.url.trim_end_matches('/'), path);
        let response = self
            .http_client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response.text().await?;
            return Err(ApiError::server_error(status, retry_after.as_deref(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| ApiError::decode(path, err))
    }

    async fn fetch<T: DeserializeOwned>(&self, query: QueryType<'_>) -> Result<Vec<T>, ApiError> {
        let path = QueryBuilder::path(&query);
        let params = QueryBuilder::params(&query);
        let page: Page<T> = self.get(&path, &params).await?;
        Ok(page.results)
    }

    /// Lists up to `limit` locations in a country.
    pub async fn list_locations(
        &self,
        country_code: &str,
        limit: u32,
    ) -> Result<Vec<Location>, ApiError> {
        self.fetch(QueryType::Locations {
            country_code,
            limit,
        })
        .await
    }

    /// Fetches one page of a sensor's measurements.
    pub async fn list_measurements(
        &self,
        sensor_id: i64,
        date_from: &str,
        date_to: &str,
        limit: u32,
        page: u32,
    ) -> Result<Vec<Measurement>, ApiError> {
        self.fetch(QueryType::Measurements {
            sensor_id,
            date_from,
            date_to,
            limit,
            page,
        })
        .await
    }

    /// Fetches the latest reading of each sensor at a location.
    pub async fn latest_for_location(
        &self,
        location_id: i64,
        limit: u32,
    ) -> Result<Vec<LatestReading>, ApiError> {
        self.fetch(QueryType::Latest { location_id, limit }).await
    }

    /// Releases the HTTP session.
    pub fn close(self) {
        tracing::debug!(url = %self.config.url, "Closing OpenAQ client");
        drop(self.http_client);
    }
}
