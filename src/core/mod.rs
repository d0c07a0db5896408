//! Core types and constants for the geotagging engine

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
