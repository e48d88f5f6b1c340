//! Trait for writing computed measurements.

use anyhow::Result;

use crate::pipeline::types::AqiMeasurement;

/// Destination for AQI measurements. A batch is written in one call and
/// either succeeds or fails as a whole.
#[async_trait::async_trait]
pub trait MeasurementSink: Send + Sync {
    async fn write_batch(&self, batch: &[AqiMeasurement]) -> Result<()>;
}
