use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, Request, Url};
use tracing::debug;

use crate::config::Config;
use crate::error::{SinkError, SourceError};
use crate::fetch::{BasicAuth, BasicClient, HttpClient, fetch_text};
use crate::infra::influx::line_protocol::encode_batch;
use crate::infra::influx::query::{mean_query, parse_response};
use crate::pipeline::types::{AggregateRecord, AqiMeasurement};
use crate::services::{AggregateSource, MeasurementSink};

/// InfluxDB 1.x HTTP API client serving as both source and sink.
pub struct InfluxClient {
    http: Box<dyn HttpClient>,
    base_url: Url,
    database: String,
    measurement: String,
}

impl InfluxClient {
    pub fn new(
        http: Box<dyn HttpClient>,
        base_url: &str,
        database: &str,
        measurement: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("data source URL '{base_url}' cannot carry an API path");
        }
        Ok(Self {
            http,
            base_url,
            database: database.to_string(),
            measurement: measurement.to_string(),
        })
    }

    /// Builds a client with the configured timeout and credentials.
    pub fn from_config(config: &Config) -> Result<Self> {
        let basic = BasicClient::new(config.request_timeout)?;
        let http: Box<dyn HttpClient> = match &config.credentials {
            Some(creds) => Box::new(BasicAuth::new(basic, &creds.username, &creds.password)?),
            None => Box::new(basic),
        };
        Self::new(http, &config.url, &config.database, &config.measurement)
    }

    /// Appends `path` to the base URL, keeping any prefix the API is mounted under.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut()
            .append_pair("db", &self.database)
            .extend_pairs(params);
        url
    }

    async fn query(&self, q: &str) -> Result<Vec<AggregateRecord>, SourceError> {
        let url = self.endpoint("query", &[("q", q)]);
        let (status, body) = fetch_text(self.http.as_ref(), Request::new(Method::GET, url)).await?;

        if !status.is_success() {
            return Err(SourceError::Status { status, body });
        }
        parse_response(&body)
    }

    async fn write(&self, lines: String) -> Result<(), SinkError> {
        let url = self.endpoint("write", &[]);
        let mut req = Request::new(Method::POST, url);
        *req.body_mut() = Some(lines.into());

        let (status, body) = fetch_text(self.http.as_ref(), req).await?;
        if !status.is_success() {
            return Err(SinkError::Status { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl AggregateSource for InfluxClient {
    #[tracing::instrument(skip(self), fields(database = %self.database))]
    async fn fetch_means(&self, field: &str, window: Duration) -> Result<Vec<AggregateRecord>> {
        let q = mean_query(&self.measurement, field, window);
        debug!(query = %q, "Querying data source");
        Ok(self.query(&q).await?)
    }
}

#[async_trait]
impl MeasurementSink for InfluxClient {
    #[tracing::instrument(skip(self, batch), fields(database = %self.database, points = batch.len()))]
    async fn write_batch(&self, batch: &[AqiMeasurement]) -> Result<()> {
        self.write(encode_batch(batch)).await?;
        debug!("Batch written");
        Ok(())
    }
}
