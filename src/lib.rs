pub mod aqi;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod pipeline;
pub mod services;
