use serde_derive::Serialize;

use super::types::{Coordinates, LatestReading, Location, Measurement, Parameter, Sensor};

/// Output columns, in the order they are written.
pub const COLUMNS: [&str; 11] = [
    "datetime_from",
    "datetime_to",
    "location_id",
    "location_name",
    "sensor_id",
    "param_id",
    "param_name",
    "value",
    "unit",
    "latitude",
    "longitude",
];

/// Metadata recorded for every sensor of a matched location.
///
/// Rows are stamped with these values so each one stays traceable to the
/// location that passed the city filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDetail {
    pub sensor_id: i64,
    pub parameter: String,
    pub param_id: Option<i64>,
    pub units: Option<String>,
    pub location_id: i64,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SensorDetail {
    /// Builds the detail for `sensor`, or `None` when the sensor or its location
    /// lacks an id, or the sensor reports no parameter name.
    pub fn from_sensor(location: &Location, sensor: &Sensor) -> Option<Self> {
        let sensor_id = sensor.id?;
        let location_id = location.id?;
        let parameter_name = sensor.parameter_name()?;
        let parameter = sensor.parameter.clone().unwrap_or_default();
        let coordinates = location.coordinates.unwrap_or_default();
        Some(Self {
            sensor_id,
            parameter: parameter_name.to_string(),
            param_id: parameter.id,
            units: parameter.units,
            location_id,
            location_name: location
                .name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        })
    }
}

/// A measurement with its nested structures lifted to top-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMeasurement {
    pub datetime_from: Option<String>,
    pub datetime_to: Option<String>,
    pub location_id: i64,
    pub location_name: String,
    pub sensor_id: i64,
    pub param_id: Option<i64>,
    pub param_name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub expected_count: Option<i64>,
    pub observed_count: Option<i64>,
    pub percent_complete: Option<f64>,
    pub percent_coverage: Option<f64>,
}

impl FlatMeasurement {
    /// Flattens `measurement`, filling gaps from the sensor's recorded metadata.
    pub fn flatten(measurement: &Measurement, detail: &SensorDetail) -> Self {
        let parameter = measurement.parameter.clone().unwrap_or_default();
        let period = measurement.period.clone().unwrap_or_default();
        let coverage = measurement.coverage.clone().unwrap_or_default();
        let (latitude, longitude) = coordinates_or(detail, measurement.coordinates);

        Self {
            datetime_from: period.datetime_from.and_then(|dt| dt.local),
            datetime_to: period.datetime_to.and_then(|dt| dt.local),
            location_id: detail.location_id,
            location_name: detail.location_name.clone(),
            sensor_id: detail.sensor_id,
            param_id: parameter.id.or(detail.param_id),
            param_name: parameter_name(&parameter).or_else(|| Some(detail.parameter.clone())),
            value: measurement.value,
            unit: parameter.units.or_else(|| detail.units.clone()),
            latitude,
            longitude,
            expected_count: coverage.expected_count,
            observed_count: coverage.observed_count,
            percent_complete: coverage.percent_complete,
            percent_coverage: coverage.percent_coverage,
        }
    }

    /// Flattens a latest-snapshot reading; its single timestamp opens and closes the window.
    pub fn from_latest(reading: &LatestReading, detail: &SensorDetail) -> Self {
        let local = reading.datetime.clone().and_then(|dt| dt.local);
        let (latitude, longitude) = coordinates_or(detail, reading.coordinates);

        Self {
            datetime_from: local.clone(),
            datetime_to: local,
            location_id: detail.location_id,
            location_name: detail.location_name.clone(),
            sensor_id: detail.sensor_id,
            param_id: detail.param_id,
            param_name: Some(detail.parameter.clone()),
            value: reading.value,
            unit: detail.units.clone(),
            latitude,
            longitude,
            expected_count: None,
            observed_count: None,
            percent_complete: None,
            percent_coverage: None,
        }
    }

    /// Expected minus observed sample count, when both are known and the difference fits.
    pub fn data_gap(&self) -> Option<i64> {
        self.expected_count?.checked_sub(self.observed_count?)
    }

    /// Projects to the fixed output schema.
    pub fn into_record(self) -> Record {
        Record {
            datetime_from: self.datetime_from,
            datetime_to: self.datetime_to,
            location_id: self.location_id,
            location_name: self.location_name,
            sensor_id: self.sensor_id,
            param_id: self.param_id,
            param_name: self.param_name,
            value: self.value,
            unit: self.unit,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

fn parameter_name(parameter: &Parameter) -> Option<String> {
    parameter.name.clone().filter(|name| !name.is_empty())
}

// location coordinates win; the measurement's own are a fallback
fn coordinates_or(detail: &SensorDetail, fallback: Option<Coordinates>) -> (Option<f64>, Option<f64>) {
    let fallback = fallback.unwrap_or_default();
    (
        detail.latitude.or(fallback.latitude),
        detail.longitude.or(fallback.longitude),
    )
}

/// One output row. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub datetime_from: Option<String>,
    pub datetime_to: Option<String>,
    pub location_id: i64,
    pub location_name: String,
    pub sensor_id: i64,
    pub param_id: Option<i64>,
    pub param_name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Record {
    /// Cell values exactly as the CSV writer renders them, `None` as an empty cell.
    pub fn cells(&self) -> Result<Vec<String>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(self)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes.as_slice());
        match reader.records().next() {
            Some(row) => Ok(row?.iter().map(str::to_string).collect()),
            None => Ok(Vec::new()),
        }
    }
}
