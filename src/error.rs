//! Error types for the boundaries of the publisher.
//!
//! Application code above these boundaries works with [`anyhow::Result`].

use thiserror::Error;

use crate::aqi::Pollutant;

/// A required setting is missing or unusable. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not defined")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("DATA_SOURCE_USERNAME and DATA_SOURCE_PASSWORD must be set together")]
    PartialCredentials,
}

/// A concentration passed the range guards but no band covers it.
#[derive(Debug, Error, PartialEq)]
#[error("no {pollutant} breakpoint band covers concentration {concentration}")]
pub struct NoMatchingBand {
    pub pollutant: Pollutant,
    pub concentration: f64,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("query request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("query returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode query response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed query response: {0}")]
    Malformed(String),

    #[error("query rejected by data source: {0}")]
    Query(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}
