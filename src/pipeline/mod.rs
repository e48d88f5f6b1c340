//! Fetch, convert and collect AQI measurements for each monitored field.

pub mod run;
pub mod types;

pub use run::{DEFAULT_WINDOW, run_all, run_for_field};
pub use types::{AggregateRecord, AqiMeasurement, Tags};
