//! InfluxQL for the windowed mean and decoding of `/query` responses.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceError;
use crate::pipeline::types::{AggregateRecord, Tags};

/// Builds the mean-over-latest-bucket query for `field`, grouped by
/// host, sensor and location. Empty buckets are dropped by `fill(none)`.
pub fn mean_query(measurement: &str, field: &str, window: Duration) -> String {
    let minutes = window.as_secs().div_ceil(60).max(1);
    format!(
        "SELECT mean({field}) FROM {measurement} WHERE time > now() - {minutes}m \
         GROUP BY time({minutes}m), \"host\", \"sensor\", \"location\" fill(none) LIMIT 1",
        field = quote_ident(field),
        measurement = quote_ident(measurement),
    )
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    tags: HashMap<String, String>,
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Decodes a `/query` response body into one record per series.
///
/// Only the first row of each series is used. A `null` mean becomes an
/// absent value; missing tags decode as empty strings.
pub fn parse_response(body: &str) -> Result<Vec<AggregateRecord>, SourceError> {
    let response: QueryResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(SourceError::Query(error));
    }

    let mut records = Vec::new();
    for statement in response.results {
        if let Some(error) = statement.error {
            return Err(SourceError::Query(error));
        }
        for series in statement.series {
            if let Some(record) = decode_series(series)? {
                records.push(record);
            }
        }
    }
    Ok(records)
}

fn decode_series(mut series: Series) -> Result<Option<AggregateRecord>, SourceError> {
    let column = |name: &str| {
        series
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SourceError::Malformed(format!("missing '{name}' column")))
    };
    let time_idx = column("time")?;
    let mean_idx = column("mean")?;

    let Some(row) = series.values.first() else {
        return Ok(None);
    };

    let time = match row.get(time_idx) {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map_err(|e| SourceError::Malformed(format!("bad time '{s}': {e}")))?
            .with_timezone(&Utc),
        other => {
            return Err(SourceError::Malformed(format!(
                "expected RFC 3339 time, got {other:?}"
            )));
        }
    };

    let mean_value = match row.get(mean_idx) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(SourceError::Malformed(format!(
                "expected numeric mean, got {other}"
            )));
        }
    };

    let mut tag = |name: &str| series.tags.remove(name).unwrap_or_default();
    let tags = Tags {
        host: tag("host"),
        location: tag("location"),
        sensor: tag("sensor"),
    };

    Ok(Some(AggregateRecord {
        time_window_start: time,
        tags,
        mean_value,
    }))
}
