//! Geotag: match photo capture times against GPX track logs and write the
//! interpolated positions back into the photos' EXIF GPS tags.
//!
//! The matching core is pure: given a time-sorted track and a target
//! timestamp it finds the bracketing track points by binary search and
//! linearly interpolates latitude, longitude, and elevation, clamping to the
//! nearest endpoint at the track boundaries and refusing to invent positions
//! across gaps wider than the configured tolerance.
//!
//! Around that core sit the collaborators a batch run needs: a GPX reader,
//! exiftool-backed metadata read/write, photo discovery, and a directory
//! scan pipeline that ties them together.

pub mod core;
pub mod exif;
pub mod gpx;
pub mod matching;
pub mod scan;
pub mod utils;

pub use core::{
    Coordinate, GeoFix, MatchStatus, PhotoRecord, TrackPoint, DEFAULT_MAX_GAP_SECONDS,
};
pub use exif::{check_exiftool, read_photo_metadata, write_gps, write_matched, ExifError};
pub use gpx::{load_gpx_dir, load_track_points, parse_gpx_file, GpxDocument, GpxError, GpxTrack};
pub use matching::{interpolate, match_photos};
pub use scan::{find_image_files, scan_photos, ScanError, ScanOutcome};
pub use utils::{ConfigError, GeotagConfig};
