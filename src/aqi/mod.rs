//! EPA breakpoint tables and AQI interpolation.
//!
//! Each [`Pollutant`] owns one immutable [`BreakpointTable`]; [`compute_aqi`]
//! maps a concentration onto the index by linear interpolation inside the
//! matching band.

pub mod breakpoints;
pub mod interpolate;

pub use breakpoints::{BreakpointBand, BreakpointTable, Pollutant};
pub use interpolate::{AqiCategory, compute_aqi};
