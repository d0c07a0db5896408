//! Data model shared between the matching core and its collaborators

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped GPS fix from a logged route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Capture time of the fix (UTC)
    pub time: DateTime<Utc>,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Elevation above sea level in meters
    pub ele: f64,
}

impl TrackPoint {
    /// The coordinate/elevation carried by this fix, without the timestamp
    pub fn fix(&self) -> GeoFix {
        GeoFix {
            lat: self.lat,
            lon: self.lon,
            ele: self.ele,
        }
    }
}

/// An interpolated (or clamped) position estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
}

/// A coordinate already embedded in a photo's EXIF data.
///
/// Exiftool reports latitude/longitude only for the existing-GPS check, so
/// this deliberately has no elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Outcome of the matching pass for a single photo.
///
/// The matcher only ever produces `HasGps`, `NoTime`, `Matched` or `NoMatch`;
/// `Written` and `Error` are set by the EXIF write-back step afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Not yet examined by the matcher
    Pending,
    /// Photo already carries GPS data; never overwritten
    HasGps,
    /// Photo has no capture timestamp to match against
    NoTime,
    /// An interpolated position was found
    Matched,
    /// No track data close enough in time
    NoMatch,
    /// Matched position written back into the file
    Written,
    /// Write-back failed
    Error,
}

/// One photo flowing through the matching pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub filename: String,
    pub filepath: PathBuf,
    /// Capture time (UTC), if the file carries one
    pub time: Option<DateTime<Utc>>,
    /// Pre-existing EXIF coordinate, if any
    pub existing: Option<Coordinate>,
    /// Interpolated position; always set when `status` is `Matched`
    pub matched: Option<GeoFix>,
    pub status: MatchStatus,
}

impl PhotoRecord {
    /// Create a record with no metadata yet, awaiting the matcher
    pub fn new(filepath: PathBuf) -> Self {
        let filename = filepath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            filepath,
            time: None,
            existing: None,
            matched: None,
            status: MatchStatus::Pending,
        }
    }
}
