//! Time-based linear interpolation over a sorted track-point sequence

use chrono::{DateTime, Duration, Utc};

use crate::core::{GeoFix, TrackPoint};

/// Estimate the position at `target` from a time-sorted track.
///
/// `track` must be sorted ascending by time; this is the caller's obligation
/// and is not re-verified here. Returns `None` when the track is empty, when
/// `target` falls outside the track's span by more than `max_gap`, or when
/// the two points bracketing `target` are themselves more than `max_gap`
/// apart. Targets outside the span but within `max_gap` clamp to the nearest
/// boundary point rather than extrapolating.
pub fn interpolate(
    track: &[TrackPoint],
    target: DateTime<Utc>,
    max_gap: Duration,
) -> Option<GeoFix> {
    if track.is_empty() {
        return None;
    }
    debug_assert!(
        track.windows(2).all(|w| w[0].time <= w[1].time),
        "track points must be sorted by time"
    );

    // Leftmost index whose time is >= target (lower bound)
    let idx = track.partition_point(|p| p.time < target);

    if idx < track.len() && track[idx].time == target {
        return Some(track[idx].fix());
    }

    if idx == 0 {
        let gap = track[0].time - target;
        if gap <= max_gap {
            return Some(track[0].fix());
        }
        return None;
    }

    if idx >= track.len() {
        let last = &track[track.len() - 1];
        let gap = target - last.time;
        if gap <= max_gap {
            return Some(last.fix());
        }
        return None;
    }

    let before = &track[idx - 1];
    let after = &track[idx];
    let total_gap = after.time - before.time;

    // The bracketing points are too sparse to trust an interpolated position
    if total_gap > max_gap {
        return None;
    }
    // Duplicate timestamps: take the earlier point, avoiding a zero division
    if total_gap.is_zero() {
        return Some(before.fix());
    }

    let elapsed = target - before.time;
    // Nanosecond resolution: sub-millisecond spans must not truncate to 0/0.
    // num_nanoseconds only overflows for spans of centuries, which cannot
    // pass the gap check with any sane tolerance; milliseconds cover the rest.
    let ratio = match (elapsed.num_nanoseconds(), total_gap.num_nanoseconds()) {
        (Some(elapsed_ns), Some(total_ns)) => elapsed_ns as f64 / total_ns as f64,
        _ => elapsed.num_milliseconds() as f64 / total_gap.num_milliseconds() as f64,
    };

    Some(GeoFix {
        lat: before.lat + (after.lat - before.lat) * ratio,
        lon: before.lon + (after.lon - before.lon) * ratio,
        ele: before.ele + (after.ele - before.ele) * ratio,
    })
}
