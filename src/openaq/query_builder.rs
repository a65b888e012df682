//! Path and query-string builders for OpenAQ v3 requests.
//!
//! Keeps endpoint shapes in one place so the client only deals with
//! transport and decoding.

/// Requests supported by the collector.
#[derive(Debug, Clone)]
pub enum QueryType<'a> {
    /// Locations of one country, sensors embedded
    Locations { country_code: &'a str, limit: u32 },
    /// One page of a sensor's measurements within a date window
    Measurements {
        sensor_id: i64,
        date_from: &'a str,
        date_to: &'a str,
        limit: u32,
        page: u32,
    },
    /// Most recent reading of every sensor at a location
    Latest { location_id: i64, limit: u32 },
}

/// Builder for OpenAQ request paths and query parameters.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Returns the request path for the given query type.
    pub fn path(query_type: &QueryType) -> String {
        match query_type {
            QueryType::Locations { .. } => "/v3/locations".to_string(),
            QueryType::Measurements { sensor_id, .. } => {
                format!("/v3/sensors/{}/measurements", sensor_id)
            }
            QueryType::Latest { location_id, .. } => {
                format!("/v3/locations/{}/latest", location_id)
            }
        }
    }

    /// Returns the query parameters for the given query type.
    pub fn params(query_type: &QueryType) -> Vec<(&'static str, String)> {
        match query_type {
            QueryType::Locations {
                country_code,
                limit,
            } => vec![
                ("iso", country_code.to_string()),
                ("limit", limit.to_string()),
            ],
            QueryType::Measurements {
                date_from,
                date_to,
                limit,
                page,
                ..
            } => vec![
                ("datetime_from", date_from.to_string()),
                ("datetime_to", date_to.to_string()),
                ("limit", limit.to_string()),
                ("page", page.to_string()),
            ],
            QueryType::Latest { limit, .. } => vec![("limit", limit.to_string())],
        }
    }
}
