//! Response schema for the OpenAQ v3 endpoints the collector consumes.
//!
//! Every field the API may omit is an `Option`. Fields go through [`lenient`],
//! so a missing, null or wrongly typed value decodes as `None`. A list entry
//! that is not an object at all is dropped from its page with a warning.

use serde::de::{DeserializeOwned, Deserializer};
use serde_derive::Deserialize;
use serde_json::Value;

/// Decodes an optional field, mapping any malformed value to `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = <Option<Value> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = <Option<Vec<Value>> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!("Skipping malformed result: {}", err);
                None
            }
        })
        .collect())
}

/// Envelope shared by all list endpoints: `{ "meta": {...}, "results": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "lenient_items")]
    pub results: Vec<T>,
}

/// Geographical coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
}

/// A timestamp reported in both UTC and station-local time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatetimeObject {
    #[serde(default, deserialize_with = "lenient")]
    pub utc: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub local: Option<String>,
}

/// A measured pollutant or physical quantity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub units: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
}

/// A sensor as embedded in a location listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sensor {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub parameter: Option<Parameter>,
}

impl Sensor {
    /// The parameter name, if the API reported one.
    pub fn parameter_name(&self) -> Option<&str> {
        self.parameter
            .as_ref()
            .and_then(|parameter| parameter.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// A monitoring station from `/v3/locations`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    // often the city name
    #[serde(default, deserialize_with = "lenient")]
    pub locality: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub sensors: Vec<Sensor>,
}

impl Location {
    /// Case-sensitive substring match of `city` against the locality.
    pub fn locality_contains(&self, city: &str) -> bool {
        self.locality
            .as_deref()
            .is_some_and(|locality| locality.contains(city))
    }
}

/// Time window a measurement covers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub interval: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub datetime_from: Option<DatetimeObject>,
    #[serde(default, deserialize_with = "lenient")]
    pub datetime_to: Option<DatetimeObject>,
}

/// Completeness of the data behind a measurement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    #[serde(default, deserialize_with = "lenient")]
    pub expected_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub observed_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub percent_complete: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub percent_coverage: Option<f64>,
}

/// One reading from `/v3/sensors/{id}/measurements`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Measurement {
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub parameter: Option<Parameter>,
    #[serde(default, deserialize_with = "lenient")]
    pub period: Option<Period>,
    #[serde(default, deserialize_with = "lenient")]
    pub coverage: Option<Coverage>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
}

/// One entry from `/v3/locations/{id}/latest`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReading {
    #[serde(default, deserialize_with = "lenient")]
    pub datetime: Option<DatetimeObject>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "lenient")]
    pub sensors_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub locations_id: Option<i64>,
}
