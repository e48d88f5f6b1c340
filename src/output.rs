//! Publish gate: writes the computed batch to the sink, or only logs it.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::pipeline::types::AqiMeasurement;
use crate::services::MeasurementSink;

/// What the gate did with a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Submitted(usize),
    Skipped(usize),
}

/// Logs a batch of measurements as pretty-printed JSON at debug level.
pub fn log_json(measurements: &[AqiMeasurement]) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(measurements)?);
    Ok(())
}

/// Logs every measurement and, if `should_publish` is set, writes them to
/// `sink` as a single batch. Empty batches are never written.
#[tracing::instrument(skip(measurements, sink), fields(count = measurements.len()))]
pub async fn publish<K: MeasurementSink + ?Sized>(
    measurements: &[AqiMeasurement],
    should_publish: bool,
    sink: &K,
) -> Result<PublishOutcome> {
    for m in measurements {
        info!(
            field = %m.field_name,
            aqi = m.aqi_value,
            host = %m.tags.host,
            location = %m.tags.location,
            sensor = %m.tags.sensor,
            "Update"
        );
    }
    log_json(measurements)?;

    if !should_publish {
        info!("Skipping result submission");
        return Ok(PublishOutcome::Skipped(measurements.len()));
    }
    if measurements.is_empty() {
        info!("Nothing to submit");
        return Ok(PublishOutcome::Skipped(0));
    }

    info!("Submitting results");
    sink.write_batch(measurements)
        .await
        .context("failed to write AQI batch")?;

    Ok(PublishOutcome::Submitted(measurements.len()))
}
