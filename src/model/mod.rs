//! Model definitions for OpenAQ responses and the flat output records.
//!
//! `types` mirrors the API payloads, `records` holds the flattened rows
//! written to CSV, and `utilities` summarizes a finished record set.

pub mod records;
pub mod types;
pub mod utilities;

// Re-export commonly used items at the module level
pub use records::{FlatMeasurement, Record, SensorDetail, COLUMNS};
pub use types::{LatestReading, Location, Measurement, Page};
pub use utilities::{value_stats, ValueStats};
