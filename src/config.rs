//! Runtime settings read from the environment.

use std::time::Duration;

use crate::error::ConfigError;
use crate::pipeline::DEFAULT_WINDOW;

const DEFAULT_PORT: u16 = 8086;
const DEFAULT_MEASUREMENT: &str = "airquality";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username and password sent with every data-source request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the data source HTTP API, without a trailing slash.
    pub url: String,
    pub database: String,
    /// Measurement holding raw sensor readings.
    pub measurement: String,
    pub credentials: Option<Credentials>,
    pub should_submit: bool,
    pub window: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, "DATA_SOURCE_URL")?;
        let database = required(&lookup, "DATA_SOURCE_DATABASE")?;

        let measurement = lookup("DATA_SOURCE_MEASUREMENT")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MEASUREMENT.to_string());

        let credentials = match (
            lookup("DATA_SOURCE_USERNAME"),
            lookup("DATA_SOURCE_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCredentials),
        };

        let should_submit = !lookup("NO_SUBMIT")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let window = minutes(&lookup, "AQI_WINDOW_MINUTES")?.unwrap_or(DEFAULT_WINDOW);
        let request_timeout = seconds(&lookup, "REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            url: normalize_url(&url),
            database,
            measurement,
            credentials,
            should_submit,
            window,
            request_timeout,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn positive_int<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn minutes<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(positive_int(lookup, name)?.map(|m| Duration::from_secs(m * 60)))
}

fn seconds<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(positive_int(lookup, name)?.map(Duration::from_secs))
}

/// Accepts either a full URL or a bare host, which gets `http://` and the
/// default port.
fn normalize_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.contains("://") {
        raw.to_string()
    } else if raw.contains(':') {
        format!("http://{raw}")
    } else {
        format!("http://{raw}:{DEFAULT_PORT}")
    }
}
