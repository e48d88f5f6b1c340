use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};
use aqi_publisher::aqi::Pollutant;
use aqi_publisher::output::{PublishOutcome, publish};
use aqi_publisher::pipeline::{
    AggregateRecord, AqiMeasurement, DEFAULT_WINDOW, Tags, run_all, run_for_field,
};
use aqi_publisher::services::{AggregateSource, MeasurementSink};
use chrono::Utc;

/// Returns canned records per field and remembers what was asked for.
#[derive(Default)]
struct FakeSource {
    pm25: Vec<AggregateRecord>,
    pm100: Vec<AggregateRecord>,
    fail: bool,
    calls: Mutex<Vec<(String, Duration)>>,
}

#[async_trait::async_trait]
impl AggregateSource for FakeSource {
    async fn fetch_means(&self, field: &str, window: Duration) -> Result<Vec<AggregateRecord>> {
        self.calls.lock().unwrap().push((field.to_string(), window));
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(match field {
            "pm25" => self.pm25.clone(),
            "pm100" => self.pm100.clone(),
            _ => Vec::new(),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<Vec<AqiMeasurement>>>,
    fail: bool,
}

#[async_trait::async_trait]
impl MeasurementSink for RecordingSink {
    async fn write_batch(&self, batch: &[AqiMeasurement]) -> Result<()> {
        self.batches.lock().unwrap().push(batch.to_vec());
        if self.fail {
            return Err(anyhow!("write timed out"));
        }
        Ok(())
    }
}

fn tags(host: &str) -> Tags {
    Tags {
        host: host.into(),
        location: "porch".into(),
        sensor: "pms5003".into(),
    }
}

fn record(host: &str, mean_value: Option<f64>) -> AggregateRecord {
    AggregateRecord {
        time_window_start: Utc::now(),
        tags: tags(host),
        mean_value,
    }
}

#[tokio::test]
async fn test_present_mean_becomes_measurement() {
    let source = FakeSource {
        pm25: vec![record("pi1", Some(35.4))],
        ..Default::default()
    };

    let out = run_for_field("pm25", Pollutant::Pm25.table(), DEFAULT_WINDOW, &source)
        .await
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].aqi_value, 100);
    assert_eq!(out[0].field_name, "pm25");
    assert_eq!(out[0].tags, tags("pi1"));
    assert_eq!(
        source.calls.lock().unwrap().as_slice(),
        &[("pm25".to_string(), Duration::from_secs(660))]
    );
}

#[tokio::test]
async fn test_absent_mean_is_skipped() {
    let source = FakeSource {
        pm25: vec![record("pi1", None)],
        ..Default::default()
    };

    let out = run_for_field("pm25", Pollutant::Pm25.table(), DEFAULT_WINDOW, &source)
        .await
        .unwrap();

    assert!(out.is_empty());
}

#[tokio::test]
async fn test_run_all_keeps_field_and_source_order() {
    let source = FakeSource {
        pm25: vec![record("pi1", Some(12.0)), record("pi2", None), record("pi3", Some(600.0))],
        pm100: vec![record("pi1", Some(154.0))],
        ..Default::default()
    };

    let out = run_all(&Pollutant::MONITORED, DEFAULT_WINDOW, &source)
        .await
        .unwrap();

    let summary: Vec<_> = out
        .iter()
        .map(|m| (m.field_name.as_str(), m.tags.host.as_str(), m.aqi_value))
        .collect();
    assert_eq!(
        summary,
        vec![("pm25", "pi1", 50), ("pm25", "pi3", 501), ("pm100", "pi1", 100)]
    );
}

#[tokio::test]
async fn test_source_failure_aborts_run() {
    let source = FakeSource {
        fail: true,
        ..Default::default()
    };

    let err = run_all(&Pollutant::MONITORED, DEFAULT_WINDOW, &source)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("connection refused"));
    // stops at the first field
    assert_eq!(source.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gate_closed_never_calls_sink() {
    let source = FakeSource {
        pm25: vec![record("pi1", Some(8.0)), record("pi2", Some(40.0))],
        pm100: vec![record("pi1", Some(20.0))],
        ..Default::default()
    };
    let sink = RecordingSink::default();

    let measurements = run_all(&Pollutant::MONITORED, DEFAULT_WINDOW, &source)
        .await
        .unwrap();
    let outcome = publish(&measurements, false, &sink).await.unwrap();

    assert_eq!(outcome, PublishOutcome::Skipped(3));
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_gate_open_writes_one_batch() {
    let source = FakeSource {
        pm25: vec![record("pi1", Some(8.0)), record("pi2", Some(40.0))],
        ..Default::default()
    };
    let sink = RecordingSink::default();

    let measurements = run_all(&Pollutant::MONITORED, DEFAULT_WINDOW, &source)
        .await
        .unwrap();
    let outcome = publish(&measurements, true, &sink).await.unwrap();

    assert_eq!(outcome, PublishOutcome::Submitted(2));
    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], measurements);
}

#[tokio::test]
async fn test_empty_batch_is_not_written() {
    let sink = RecordingSink::default();

    let outcome = publish(&[], true, &sink).await.unwrap();

    assert_eq!(outcome, PublishOutcome::Skipped(0));
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sink_failure_is_reported() {
    let source = FakeSource {
        pm25: vec![record("pi1", Some(8.0))],
        ..Default::default()
    };
    let sink = RecordingSink {
        fail: true,
        ..Default::default()
    };

    let measurements = run_all(&Pollutant::MONITORED, DEFAULT_WINDOW, &source)
        .await
        .unwrap();
    let result = publish(&measurements, true, &sink).await;

    assert!(result.is_err());
}
