//! GPX parsing built on quick-xml's event reader

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::TrackPoint;

use super::GpxError;

/// One parsed GPX file: timestamped points for matching plus the raw
/// per-track geometry for map display
#[derive(Debug, Clone, PartialEq)]
pub struct GpxDocument {
    /// Source label, normally the file stem
    pub name: String,
    /// Track points and waypoints that carry a timestamp
    pub points: Vec<TrackPoint>,
    /// One entry per `<trk>` element, in document order
    pub tracks: Vec<GpxTrack>,
}

/// A single `<trk>` element's display name and geometry
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrack {
    /// The track's own `<name>`, or the file stem when absent
    pub name: String,
    /// Per-segment `[lon, lat]` pairs, including timestamp-less points
    pub segments: Vec<Vec<[f64; 2]>>,
}

/// Parse a GPX document from a string.
///
/// Handles `trkpt` and `wpt` elements (namespace-prefix tolerant), reading
/// `lat`/`lon` attributes and child `ele`/`time` elements. Points without a
/// timestamp are kept in the segment geometry but excluded from the matchable
/// point list; a missing elevation defaults to 0.0.
pub fn parse_gpx_str(name: &str, content: &str) -> Result<GpxDocument, GpxError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let xml_err = |e: quick_xml::Error| GpxError::Xml {
        path: name.to_string(),
        message: e.to_string(),
    };

    let mut doc = GpxDocument {
        name: name.to_string(),
        points: Vec::new(),
        tracks: Vec::new(),
    };

    let mut lat = 0.0;
    let mut lon = 0.0;
    let mut ele: Option<f64> = None;
    let mut time: Option<DateTime<Utc>> = None;
    let mut in_point = false;
    let mut in_trk = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            // Self-closing points carry no child elements, so they can only
            // contribute segment geometry
            Ok(Event::Empty(e)) => {
                let elem = e.name().as_ref().to_vec();
                let elem = elem.as_slice();
                if elem.ends_with(b"trkpt") {
                    let (lat, lon) = point_attributes(&e);
                    if let Some(segment) = current_segment(&mut doc) {
                        segment.push([lon, lat]);
                    }
                }
            }
            Ok(Event::Start(e)) => {
                let elem = e.name().as_ref().to_vec();
                let elem = elem.as_slice();
                if elem.ends_with(b"trkseg") {
                    if let Some(track) = doc.tracks.last_mut() {
                        track.segments.push(Vec::new());
                    }
                } else if elem.ends_with(b"trkpt") || elem.ends_with(b"wpt") {
                    ele = None;
                    time = None;
                    in_point = true;
                    let (point_lat, point_lon) = point_attributes(&e);
                    lat = point_lat;
                    lon = point_lon;
                } else if in_point && elem.ends_with(b"ele") {
                    if let Ok(Event::Text(t)) = reader.read_event_into(&mut buf) {
                        ele = t.unescape().ok().and_then(|v| v.parse::<f64>().ok());
                    }
                } else if in_point && elem.ends_with(b"time") {
                    if let Ok(Event::Text(t)) = reader.read_event_into(&mut buf) {
                        let text = t.unescape().unwrap_or_default();
                        time = parse_gpx_time(&text);
                    }
                } else if in_trk && !in_point && elem.ends_with(b"name") {
                    // Each track keeps its own name; a document-level
                    // <metadata><name> must not shadow it
                    if let Ok(Event::Text(t)) = reader.read_event_into(&mut buf) {
                        let text = t.unescape().unwrap_or_default().trim().to_string();
                        if !text.is_empty() {
                            if let Some(track) = doc.tracks.last_mut() {
                                if track.name.is_empty() {
                                    track.name = text;
                                }
                            }
                        }
                    }
                } else if elem.ends_with(b"trk") {
                    doc.tracks.push(GpxTrack {
                        name: String::new(),
                        segments: Vec::new(),
                    });
                    in_trk = true;
                }
            }
            Ok(Event::End(e)) => {
                let elem = e.name().as_ref().to_vec();
                let elem = elem.as_slice();
                if elem.ends_with(b"trkpt") {
                    if let Some(segment) = current_segment(&mut doc) {
                        segment.push([lon, lat]);
                    }
                    push_point(&mut doc.points, time, lat, lon, ele);
                    in_point = false;
                } else if elem.ends_with(b"wpt") {
                    push_point(&mut doc.points, time, lat, lon, ele);
                    in_point = false;
                } else if elem.ends_with(b"trk") {
                    in_trk = false;
                }
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    for track in &mut doc.tracks {
        if track.name.is_empty() {
            track.name = doc.name.clone();
        }
    }
    Ok(doc)
}

fn current_segment(doc: &mut GpxDocument) -> Option<&mut Vec<[f64; 2]>> {
    doc.tracks.last_mut().and_then(|t| t.segments.last_mut())
}

fn point_attributes(e: &quick_xml::events::BytesStart<'_>) -> (f64, f64) {
    let mut lat = 0.0;
    let mut lon = 0.0;
    for attr in e.attributes().flatten() {
        let value = std::str::from_utf8(&attr.value)
            .ok()
            .and_then(|v| v.parse::<f64>().ok());
        if attr.key.as_ref().ends_with(b"lat") {
            lat = value.unwrap_or(0.0);
        } else if attr.key.as_ref().ends_with(b"lon") {
            lon = value.unwrap_or(0.0);
        }
    }
    (lat, lon)
}

fn push_point(
    points: &mut Vec<TrackPoint>,
    time: Option<DateTime<Utc>>,
    lat: f64,
    lon: f64,
    ele: Option<f64>,
) {
    if let Some(time) = time {
        points.push(TrackPoint {
            time,
            lat,
            lon,
            ele: ele.unwrap_or(0.0),
        });
    }
}

/// Accept RFC 3339 timestamps (with `Z` or an offset) and the offset-less
/// form some loggers emit, which is taken as UTC
fn parse_gpx_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Parse a single GPX file
pub fn parse_gpx_file<P: AsRef<Path>>(path: P) -> Result<GpxDocument, GpxError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let content = fs::read_to_string(path).map_err(|e| GpxError::Io {
        path: path.to_string_lossy().into_owned(),
        message: e.to_string(),
    })?;
    // Errors should name the offending file, not the display label
    parse_gpx_str(&name, &content).map_err(|e| match e {
        GpxError::Xml { message, .. } => GpxError::Xml {
            path: path.to_string_lossy().into_owned(),
            message,
        },
        other => other,
    })
}

/// Parse every `*.gpx` file in a directory, in filename order.
///
/// Unreadable or malformed files are skipped with a warning so a single bad
/// log cannot sink the whole batch. A missing or empty directory yields an
/// empty list.
pub fn load_gpx_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<GpxDocument>, GpxError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| GpxError::Io {
        path: dir.to_string_lossy().into_owned(),
        message: e.to_string(),
    })?;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_gpx = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gpx"))
            .unwrap_or(false);
        if path.is_file() && is_gpx {
            paths.push(path);
        }
    }
    paths.sort();

    let mut docs = Vec::new();
    for path in paths {
        match parse_gpx_file(&path) {
            Ok(doc) => docs.push(doc),
            Err(e) => eprintln!("Warning: skipping GPX file: {}", e),
        }
    }
    Ok(docs)
}

/// Load all track points under a directory, merged across files and globally
/// sorted by time — the input invariant the interpolator relies on
pub fn load_track_points<P: AsRef<Path>>(dir: P) -> Result<Vec<TrackPoint>, GpxError> {
    let docs = load_gpx_dir(dir)?;
    let mut points: Vec<TrackPoint> = docs.into_iter().flat_map(|d| d.points).collect();
    points.sort_by_key(|p| p.time);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="logger" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning ride</name>
    <trkseg>
      <trkpt lat="37.50" lon="127.00">
        <ele>10.0</ele>
        <time>2024-05-01T10:00:00Z</time>
      </trkpt>
      <trkpt lat="37.52" lon="127.05">
        <ele>20.0</ele>
        <time>2024-05-01T10:10:00Z</time>
      </trkpt>
      <trkpt lat="37.53" lon="127.06"/>
    </trkseg>
    <trkseg>
      <trkpt lat="37.54" lon="127.07">
        <time>2024-05-01T10:20:00+09:00</time>
      </trkpt>
    </trkseg>
  </trk>
  <wpt lat="37.60" lon="127.10">
    <ele>33.0</ele>
    <time>2024-05-01T11:00:00Z</time>
  </wpt>
</gpx>"#;

    #[test]
    fn test_parse_track_points_and_name() {
        let doc = parse_gpx_str("track1", SAMPLE).unwrap();
        assert_eq!(doc.name, "track1");
        assert_eq!(doc.tracks.len(), 1);
        assert_eq!(doc.tracks[0].name, "Morning ride");
        // Timestamp-less trkpt and the Empty-element form are excluded
        assert_eq!(doc.points.len(), 4);

        let first = doc.points[0];
        assert_eq!(first.time, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        assert!((first.lat - 37.50).abs() < 1e-9);
        assert!((first.lon - 127.00).abs() < 1e-9);
        assert!((first.ele - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_timestamps_normalized_to_utc() {
        let doc = parse_gpx_str("track1", SAMPLE).unwrap();
        // +09:00 local 10:20 is 01:20 UTC
        let offset_point = doc.points[2];
        assert_eq!(
            offset_point.time,
            Utc.with_ymd_and_hms(2024, 5, 1, 1, 20, 0).unwrap()
        );
        // Elevation missing on that point defaults to 0.0
        assert_eq!(offset_point.ele, 0.0);
    }

    #[test]
    fn test_waypoints_included() {
        let doc = parse_gpx_str("track1", SAMPLE).unwrap();
        let wpt = doc.points.last().unwrap();
        assert!((wpt.lat - 37.60).abs() < 1e-9);
        assert!((wpt.ele - 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_geometry_keeps_all_points() {
        let doc = parse_gpx_str("track1", SAMPLE).unwrap();
        let segments = &doc.tracks[0].segments;
        assert_eq!(segments.len(), 2);
        // The timestamp-less self-closing point still appears in the geometry
        assert_eq!(segments[0].len(), 3);
        assert_eq!(segments[0][2], [127.06, 37.53]);
        assert_eq!(segments[0][0], [127.00, 37.50]);
        assert_eq!(segments[1].len(), 1);
    }

    #[test]
    fn test_per_track_names_ignore_metadata_name() {
        let gpx = r#"<gpx>
          <metadata><name>Whole file</name></metadata>
          <trk><name>First leg</name><trkseg>
            <trkpt lat="1.0" lon="1.0"/>
          </trkseg></trk>
          <trk><name>Second leg</name><trkseg>
            <trkpt lat="2.0" lon="2.0"/>
          </trkseg></trk>
        </gpx>"#;
        let doc = parse_gpx_str("file", gpx).unwrap();
        assert_eq!(doc.tracks.len(), 2);
        assert_eq!(doc.tracks[0].name, "First leg");
        assert_eq!(doc.tracks[1].name, "Second leg");
        assert_eq!(doc.tracks[0].segments[0], vec![[1.0, 1.0]]);
        assert_eq!(doc.tracks[1].segments[0], vec![[2.0, 2.0]]);
    }

    #[test]
    fn test_offsetless_time_taken_as_utc() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="1.0" lon="2.0"><time>2024-05-01T10:00:00</time></trkpt>
        </trkseg></trk></gpx>"#;
        let doc = parse_gpx_str("t", gpx).unwrap();
        assert_eq!(
            doc.points[0].time,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_track_name_falls_back_to_file_stem() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="1.0" lon="2.0"><time>2024-05-01T10:00:00Z</time></trkpt>
        </trkseg></trk></gpx>"#;
        let doc = parse_gpx_str("track7", gpx).unwrap();
        assert_eq!(doc.tracks[0].name, "track7");
    }

    #[test]
    fn test_parse_error_carries_full_path() {
        use std::fs;
        let dir = std::env::temp_dir().join("geotag_gpx_error_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.gpx");
        fs::write(&path, "<gpx><trk></wrong></gpx>").unwrap();

        match parse_gpx_file(&path) {
            Err(GpxError::Xml { path: reported, .. }) => {
                assert_eq!(reported, path.to_string_lossy());
            }
            other => panic!("expected an XML error, got {:?}", other),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_track_points_merges_and_sorts() {
        use std::fs;
        let dir = std::env::temp_dir().join("geotag_gpx_parser_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        // Later timestamps deliberately placed in the alphabetically first file
        fs::write(
            dir.join("a.gpx"),
            r#"<gpx><trk><trkseg>
                <trkpt lat="2.0" lon="2.0"><time>2024-05-01T12:00:00Z</time></trkpt>
            </trkseg></trk></gpx>"#,
        )
        .unwrap();
        fs::write(
            dir.join("b.gpx"),
            r#"<gpx><trk><trkseg>
                <trkpt lat="1.0" lon="1.0"><time>2024-05-01T10:00:00Z</time></trkpt>
            </trkseg></trk></gpx>"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "not a gpx file").unwrap();

        let points = load_track_points(&dir).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].time < points[1].time);
        assert!((points[0].lat - 1.0).abs() < 1e-9);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_directory_yields_empty() {
        let points = load_track_points("/nonexistent/geotag_gpx_dir").unwrap();
        assert!(points.is_empty());
    }
}
