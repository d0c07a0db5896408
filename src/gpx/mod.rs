//! GPX track-log ingestion
//!
//! Parses GPX files into time-sorted track-point sequences for the matcher
//! and retains per-segment geometry for GeoJSON export.

pub mod geojson;
pub mod parser;

pub use geojson::track_feature_collection;
pub use parser::{
    load_gpx_dir, load_track_points, parse_gpx_file, parse_gpx_str, GpxDocument, GpxTrack,
};

use std::fmt;

/// Errors raised while reading GPX data
#[derive(Debug, Clone, PartialEq)]
pub enum GpxError {
    Io { path: String, message: String },
    Xml { path: String, message: String },
}

impl fmt::Display for GpxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpxError::Io { path, message } => {
                write!(f, "Failed to read GPX '{}': {}", path, message)
            }
            GpxError::Xml { path, message } => {
                write!(f, "Malformed GPX '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for GpxError {}
