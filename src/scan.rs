//! Photo discovery and the full directory scan pipeline

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::{PhotoRecord, IMAGE_EXTENSIONS};
use crate::exif;
use crate::gpx::{self, GpxError};
use crate::matching;
use crate::utils::config::GeotagConfig;

/// Result of scanning one photo directory
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Photo records after the matching pass
    pub photos: Vec<PhotoRecord>,
    /// GPX track geometry as a GeoJSON FeatureCollection
    pub track_geojson: Value,
    /// Number of matchable track points loaded
    pub trackpoint_count: usize,
    /// Whether a gpx/ subdirectory was present at all
    pub gpx_available: bool,
}

/// Errors raised by the scan pipeline
#[derive(Debug)]
pub enum ScanError {
    Io { path: String, message: String },
    Gpx(GpxError),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Io { path, message } => {
                write!(f, "Failed to scan '{}': {}", path, message)
            }
            ScanError::Gpx(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<GpxError> for ScanError {
    fn from(e: GpxError) -> Self {
        ScanError::Gpx(e)
    }
}

/// List the supported image files directly inside a directory, sorted by
/// name. Subdirectories (including the gpx/ and no_gps/ bookkeeping folders)
/// are not descended into.
pub fn find_image_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, ScanError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| ScanError::Io {
        path: dir.to_string_lossy().into_owned(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if supported {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Scan a photo directory end to end: discover images, read their metadata,
/// load the GPX track from the configured subfolder, and run the matcher.
pub fn scan_photos(photo_dir: &Path, config: &GeotagConfig) -> Result<ScanOutcome, ScanError> {
    let gpx_dir = photo_dir.join(&config.gpx_subdir);
    let gpx_available = gpx_dir.is_dir();

    let docs = gpx::load_gpx_dir(&gpx_dir)?;
    let track_geojson = gpx::track_feature_collection(&docs);
    let mut track: Vec<_> = docs.into_iter().flat_map(|d| d.points).collect();
    track.sort_by_key(|p| p.time);

    let mut photos: Vec<PhotoRecord> = find_image_files(photo_dir)?
        .iter()
        .map(|path| exif::read_photo_metadata(&config.exiftool_path, path))
        .collect();

    matching::match_photos(&mut photos, &track, config.max_gap());

    Ok(ScanOutcome {
        photos,
        track_geojson,
        trackpoint_count: track.len(),
        gpx_available,
    })
}
