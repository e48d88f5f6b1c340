//! Capabilities the pipeline consumes.

pub mod aggregate_source;
pub mod sink;

pub use aggregate_source::AggregateSource;
pub use sink::MeasurementSink;
