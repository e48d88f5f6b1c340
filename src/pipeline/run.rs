use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::aqi::{AqiCategory, BreakpointTable, Pollutant, compute_aqi};
use crate::pipeline::types::{AggregateRecord, AqiMeasurement};
use crate::services::AggregateSource;

/// Window and bucket length used when none is configured. Sensors report
/// about every ten minutes.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(11 * 60);

/// Fetches the latest windowed means of `field_name` and converts each
/// present mean into an [`AqiMeasurement`].
///
/// Groups without a mean are skipped. A reading that no band covers is
/// logged and skipped without affecting the rest of the field.
#[tracing::instrument(skip(table, source), fields(pollutant = %table.pollutant()))]
pub async fn run_for_field<S: AggregateSource + ?Sized>(
    field_name: &str,
    table: &BreakpointTable,
    window: Duration,
    source: &S,
) -> Result<Vec<AqiMeasurement>> {
    let records = source
        .fetch_means(field_name, window)
        .await
        .with_context(|| format!("failed to fetch means for field '{field_name}'"))?;

    debug!(groups = records.len(), "Aggregates received");

    let mut measurements = Vec::with_capacity(records.len());
    for record in records {
        if let Some(measurement) = convert_record(field_name, table, record) {
            measurements.push(measurement);
        }
    }

    info!(computed = measurements.len(), "Field processed");
    Ok(measurements)
}

fn convert_record(
    field_name: &str,
    table: &BreakpointTable,
    record: AggregateRecord,
) -> Option<AqiMeasurement> {
    let AggregateRecord {
        time_window_start,
        tags,
        mean_value,
    } = record;

    let Some(mean) = mean_value else {
        debug!(host = %tags.host, sensor = %tags.sensor, "No mean in window, skipping");
        return None;
    };

    match compute_aqi(mean, table) {
        Ok(aqi) => {
            info!(
                host = %tags.host,
                location = %tags.location,
                sensor = %tags.sensor,
                time = %time_window_start,
                concentration = table.round(mean),
                aqi,
                category = AqiCategory::from_aqi(aqi).label(),
                "AQI computed"
            );
            Some(AqiMeasurement {
                timestamp: time_window_start,
                field_name: field_name.to_string(),
                aqi_value: aqi,
                tags,
            })
        }
        Err(e) => {
            error!(host = %tags.host, sensor = %tags.sensor, error = %e, "Skipping reading");
            None
        }
    }
}

/// Runs [`run_for_field`] for each pollutant in order and concatenates the
/// results. Any source failure aborts the whole run.
pub async fn run_all<S: AggregateSource + ?Sized>(
    pollutants: &[Pollutant],
    window: Duration,
    source: &S,
) -> Result<Vec<AqiMeasurement>> {
    let mut all = Vec::new();
    for &pollutant in pollutants {
        let mut batch =
            run_for_field(pollutant.field_name(), pollutant.table(), window, source).await?;
        all.append(&mut batch);
    }
    Ok(all)
}
