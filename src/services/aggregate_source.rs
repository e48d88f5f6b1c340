//! Trait for querying windowed means from a time-series store.

use std::time::Duration;

use anyhow::Result;

use crate::pipeline::types::AggregateRecord;

/// Abstraction over a store that can average a field per sensor group.
#[async_trait::async_trait]
pub trait AggregateSource: Send + Sync {
    /// Returns the mean of `field` over the most recent `window`, one record
    /// per (host, sensor, location) group, in the store's iteration order.
    async fn fetch_means(&self, field: &str, window: Duration) -> Result<Vec<AggregateRecord>>;
}
