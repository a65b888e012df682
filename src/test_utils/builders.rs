//! Test data builders for output records.

use crate::model::Record;

/// Builder for creating `Record` instances for testing.
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Creates a pm25 record for sensor 11 at Springfield Station 1.
    pub fn new() -> Self {
        Self {
            record: Record {
                datetime_from: Some("2024-01-01T01:00:00+01:00".to_string()),
                datetime_to: Some("2024-01-01T02:00:00+01:00".to_string()),
                location_id: 1,
                location_name: "Springfield Station 1".to_string(),
                sensor_id: 11,
                param_id: Some(2),
                param_name: Some("pm25".to_string()),
                value: Some(12.0),
                unit: Some("µg/m³".to_string()),
                latitude: Some(39.78),
                longitude: Some(-89.65),
            },
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.record.value = Some(value);
        self
    }

    pub fn without_value(mut self) -> Self {
        self.record.value = None;
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}
