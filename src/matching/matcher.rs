//! Batch matching of a photo collection against a GPS track

use chrono::Duration;

use crate::core::{MatchStatus, PhotoRecord, TrackPoint};

use super::interpolate;

/// Run the matching pass over every photo record, updating each in place.
///
/// Per record, in order: a pre-existing EXIF coordinate wins (`HasGps`, never
/// overwritten), a missing capture time skips matching (`NoTime`), otherwise
/// the track is interpolated at the capture time (`Matched` or `NoMatch`).
/// On `NoMatch` any previously matched fix is left as it was.
///
/// This is re-runnable: every record is re-evaluated from its current fields
/// regardless of prior status, so calling it again after the track changed
/// may change outcomes. It never fails; every record ends in one of the four
/// statuses above.
pub fn match_photos(photos: &mut [PhotoRecord], track: &[TrackPoint], max_gap: Duration) {
    for photo in photos.iter_mut() {
        if photo.existing.is_some() {
            photo.status = MatchStatus::HasGps;
            continue;
        }

        let time = match photo.time {
            Some(time) => time,
            None => {
                photo.status = MatchStatus::NoTime;
                continue;
            }
        };

        match interpolate(track, time, max_gap) {
            Some(fix) => {
                photo.matched = Some(fix);
                photo.status = MatchStatus::Matched;
            }
            None => {
                photo.status = MatchStatus::NoMatch;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinate;
    use chrono::{DateTime, TimeZone, Utc};
    use std::path::PathBuf;

    fn point(secs: i64, lat: f64, lon: f64, ele: f64) -> TrackPoint {
        TrackPoint {
            time: Utc.timestamp_opt(secs, 0).unwrap(),
            lat,
            lon,
            ele,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn photo(name: &str, time: Option<DateTime<Utc>>) -> PhotoRecord {
        let mut record = PhotoRecord::new(PathBuf::from(format!("/photos/{}", name)));
        record.time = time;
        record
    }

    fn sample_track() -> Vec<TrackPoint> {
        vec![
            point(36000, 37.50, 127.00, 10.0),
            point(36600, 37.52, 127.05, 20.0),
        ]
    }

    #[test]
    fn test_existing_gps_takes_precedence() {
        let track = sample_track();
        // Even with a perfectly matchable capture time, existing GPS wins
        let mut photos = vec![photo("a.jpg", Some(at(36300)))];
        photos[0].existing = Some(Coordinate {
            lat: 48.85,
            lon: 2.35,
        });

        match_photos(&mut photos, &track, Duration::seconds(3600));

        assert_eq!(photos[0].status, MatchStatus::HasGps);
        assert!(photos[0].matched.is_none());
    }

    #[test]
    fn test_missing_time_skips_matching() {
        let track = sample_track();
        let mut photos = vec![photo("a.jpg", None)];

        match_photos(&mut photos, &track, Duration::seconds(3600));

        assert_eq!(photos[0].status, MatchStatus::NoTime);
        assert!(photos[0].matched.is_none());
    }

    #[test]
    fn test_matched_and_no_match_outcomes() {
        let track = sample_track();
        let mut photos = vec![
            photo("mid.jpg", Some(at(36300))),
            // 08:00 is two hours before the first point at 10:00
            photo("early.jpg", Some(at(28800))),
            photo("no_time.jpg", None),
        ];

        match_photos(&mut photos, &track, Duration::seconds(3600));

        assert_eq!(photos[0].status, MatchStatus::Matched);
        let fix = photos[0].matched.unwrap();
        assert!((fix.lat - 37.51).abs() < 1e-9);
        assert!((fix.lon - 127.025).abs() < 1e-9);
        assert!((fix.ele - 15.0).abs() < 1e-9);

        assert_eq!(photos[1].status, MatchStatus::NoMatch);
        assert!(photos[1].matched.is_none());

        assert_eq!(photos[2].status, MatchStatus::NoTime);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let track = sample_track();
        let mut photos = vec![
            photo("a.jpg", Some(at(36300))),
            photo("b.jpg", Some(at(28800))),
            photo("c.jpg", None),
        ];

        match_photos(&mut photos, &track, Duration::seconds(3600));
        let first_pass = photos.clone();
        match_photos(&mut photos, &track, Duration::seconds(3600));

        assert_eq!(photos, first_pass);
    }

    #[test]
    fn test_rerun_reevaluates_after_track_change() {
        let mut photos = vec![photo("a.jpg", Some(at(28800)))];

        match_photos(&mut photos, &sample_track(), Duration::seconds(3600));
        assert_eq!(photos[0].status, MatchStatus::NoMatch);

        // A new track point near 08:00 turns the miss into a match
        let mut track = sample_track();
        track.insert(0, point(28830, 37.40, 126.90, 5.0));
        match_photos(&mut photos, &track, Duration::seconds(3600));

        assert_eq!(photos[0].status, MatchStatus::Matched);
        assert_eq!(photos[0].matched.unwrap(), track[0].fix());
    }

    #[test]
    fn test_empty_track_marks_all_timed_photos_no_match() {
        let mut photos = vec![photo("a.jpg", Some(at(1000))), photo("b.jpg", None)];

        match_photos(&mut photos, &[], Duration::seconds(3600));

        assert_eq!(photos[0].status, MatchStatus::NoMatch);
        assert_eq!(photos[1].status, MatchStatus::NoTime);
    }
}
