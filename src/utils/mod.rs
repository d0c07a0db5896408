//! Supporting utilities

pub mod config;

pub use config::{ConfigError, GeotagConfig};
