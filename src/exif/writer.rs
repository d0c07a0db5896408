//! Writing matched coordinates back into photo files

use std::path::Path;
use std::process::Command;

use crate::core::{GeoFix, MatchStatus, PhotoRecord};

use super::ExifError;

/// Exiftool arguments for one GPS write: unsigned magnitudes with explicit
/// hemisphere refs, altitude ref 0/1 for above/below sea level
fn gps_write_args(fix: &GeoFix) -> Vec<String> {
    let lat_ref = if fix.lat >= 0.0 { "N" } else { "S" };
    let lon_ref = if fix.lon >= 0.0 { "E" } else { "W" };
    let ele_ref = if fix.ele >= 0.0 { "0" } else { "1" };
    vec![
        "-overwrite_original".to_string(),
        format!("-GPSLatitude={}", fix.lat.abs()),
        format!("-GPSLatitudeRef={}", lat_ref),
        format!("-GPSLongitude={}", fix.lon.abs()),
        format!("-GPSLongitudeRef={}", lon_ref),
        format!("-GPSAltitude={}", fix.ele.abs()),
        format!("-GPSAltitudeRef={}", ele_ref),
    ]
}

/// Write a coordinate and elevation into a photo file's EXIF GPS tags
pub fn write_gps(tool: &str, path: &Path, fix: &GeoFix) -> Result<(), ExifError> {
    let path_str = path.to_string_lossy().into_owned();
    let output = Command::new(tool)
        .args(gps_write_args(fix))
        .arg(path)
        .output()
        .map_err(|e| ExifError::CommandFailed {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(ExifError::CommandFailed {
            path: path_str,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Write a matched record's position back into its file, moving the record
/// to `Written` on success or `Error` on failure. Records in any other
/// status are left untouched.
pub fn write_matched(tool: &str, record: &mut PhotoRecord) -> bool {
    if record.status != MatchStatus::Matched {
        return false;
    }
    let fix = match record.matched {
        Some(fix) => fix,
        None => return false,
    };
    match write_gps(tool, &record.filepath, &fix) {
        Ok(()) => {
            record.status = MatchStatus::Written;
            true
        }
        Err(e) => {
            eprintln!("Warning: {}", e);
            record.status = MatchStatus::Error;
            false
        }
    }
}
