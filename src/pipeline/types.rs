//! Records flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identifies where a reading came from. Carried unchanged from input to output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tags {
    pub host: String,
    pub location: String,
    pub sensor: String,
}

/// Mean of one field over the latest bucket for a (host, sensor, location) group.
///
/// `mean_value` is `None` when the group had no samples in the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub time_window_start: DateTime<Utc>,
    pub tags: Tags,
    pub mean_value: Option<f64>,
}

/// A computed AQI ready for the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiMeasurement {
    /// Start of the source bucket. Not written to the sink, which stamps
    /// points with ingestion time.
    pub timestamp: DateTime<Utc>,
    pub field_name: String,
    pub aqi_value: u16,
    pub tags: Tags,
}

impl AqiMeasurement {
    pub const MEASUREMENT: &'static str = "AQI";
}
