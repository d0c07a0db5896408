//! Reading capture time and existing GPS data from photo files

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::core::{Coordinate, PhotoRecord};

use super::ExifError;

/// Tags requested from exiftool for the matching preconditions
#[derive(Debug, Default, Deserialize)]
struct ExifTags {
    #[serde(rename = "DateTimeOriginal")]
    date_time_original: Option<String>,
    #[serde(rename = "CreateDate")]
    create_date: Option<String>,
    #[serde(rename = "OffsetTimeOriginal")]
    offset_time_original: Option<String>,
    #[serde(rename = "OffsetTime")]
    offset_time: Option<String>,
    #[serde(rename = "GPSLatitude")]
    gps_latitude: Option<f64>,
    #[serde(rename = "GPSLongitude")]
    gps_longitude: Option<f64>,
}

/// Verify that exiftool is runnable, returning its version string
pub fn check_exiftool(tool: &str) -> Result<String, ExifError> {
    let output = Command::new(tool)
        .arg("-ver")
        .output()
        .map_err(|e| ExifError::ToolMissing {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(ExifError::ToolMissing {
            tool: tool.to_string(),
            message: format!("exit status {}", output.status),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Read one photo's capture time and existing GPS coordinate.
///
/// Any exiftool or parse failure degrades to a record with no capture time
/// and no coordinate, so a single unreadable file cannot abort a batch; the
/// matcher will file it under `NoTime`.
pub fn read_photo_metadata(tool: &str, path: &Path) -> PhotoRecord {
    let mut record = PhotoRecord::new(path.to_path_buf());
    if let Ok(tags) = read_tags(tool, path) {
        if let (Some(lat), Some(lon)) = (tags.gps_latitude, tags.gps_longitude) {
            record.existing = Some(Coordinate { lat, lon });
        }
        record.time = parse_capture_time(&tags);
    }
    record
}

fn read_tags(tool: &str, path: &Path) -> Result<ExifTags, ExifError> {
    let path_str = path.to_string_lossy().into_owned();
    let output = Command::new(tool)
        .args([
            "-j",
            "-n",
            "-DateTimeOriginal",
            "-CreateDate",
            "-OffsetTimeOriginal",
            "-OffsetTime",
            "-GPSLatitude",
            "-GPSLongitude",
        ])
        .arg(path)
        .output()
        .map_err(|e| ExifError::CommandFailed {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(ExifError::CommandFailed {
            path: path_str,
            message: format!("exit status {}", output.status),
        });
    }

    let mut entries: Vec<ExifTags> =
        serde_json::from_slice(&output.stdout).map_err(|e| ExifError::BadOutput {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
    if entries.is_empty() {
        return Err(ExifError::BadOutput {
            path: path_str,
            message: "empty result array".to_string(),
        });
    }
    Ok(entries.swap_remove(0))
}

/// Derive the UTC capture time from the returned tags.
///
/// `DateTimeOriginal` wins over `CreateDate`. A zeroed date is treated as
/// absent. Offset-less times use the EXIF offset tag when present, otherwise
/// the host's local offset.
fn parse_capture_time(tags: &ExifTags) -> Option<DateTime<Utc>> {
    let date_str = tags
        .date_time_original
        .as_deref()
        .or(tags.create_date.as_deref())?
        .trim();
    if date_str.is_empty() || date_str == "0000:00:00 00:00:00" {
        return None;
    }

    // A time with an embedded offset is already unambiguous
    if let Ok(dt) = DateTime::parse_from_str(date_str, "%Y:%m:%d %H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }

    let mut naive = None;
    for fmt in ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(date_str, fmt) {
            naive = Some(parsed);
            break;
        }
    }
    // Some cameras append fractional seconds
    let naive = match naive {
        Some(naive) => naive,
        None => {
            let trimmed = date_str.split('.').next().unwrap_or(date_str);
            NaiveDateTime::parse_from_str(trimmed, "%Y:%m:%d %H:%M:%S").ok()?
        }
    };

    let offset_str = tags
        .offset_time_original
        .as_deref()
        .or(tags.offset_time.as_deref());
    if let Some(offset) = offset_str.and_then(parse_utc_offset) {
        if let Some(dt) = offset.from_local_datetime(&naive).single() {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // No offset information: assume the camera clock ran on host-local time
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => Some(dt.with_timezone(&Utc)),
        None => Some(naive.and_utc()),
    }
}

/// Parse an EXIF offset tag such as `+09:00` or `-0530`
fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };
    let mut parts = rest.split(':');
    let first = parts.next()?;
    let (hours, minutes) = match parts.next() {
        Some(min) => (first.parse::<i32>().ok()?, min.parse::<i32>().ok()?),
        None if first.len() == 4 => (
            first[..2].parse::<i32>().ok()?,
            first[2..].parse::<i32>().ok()?,
        ),
        None => (first.parse::<i32>().ok()?, 0),
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
