//! InfluxDB 1.x backend for the aggregate source and measurement sink.
//!
//! Means are read through `/query` with InfluxQL; results are written to
//! `/write` as line protocol.

mod client;
pub mod line_protocol;
pub mod query;

pub use client::InfluxClient;
