//! GeoJSON export of parsed GPX tracks for map display

use serde_json::{json, Value};

use super::GpxDocument;

/// Build a GeoJSON `FeatureCollection` with one `LineString` feature per
/// track segment, named after its own track (or the source file when the
/// track is unnamed). Empty segments are dropped.
pub fn track_feature_collection(docs: &[GpxDocument]) -> Value {
    let mut features = Vec::new();
    for doc in docs {
        for track in &doc.tracks {
            for segment in &track.segments {
                if segment.is_empty() {
                    continue;
                }
                features.push(json!({
                    "type": "Feature",
                    "properties": { "name": track.name },
                    "geometry": {
                        "type": "LineString",
                        "coordinates": segment,
                    },
                }));
            }
        }
    }
    json!({ "type": "FeatureCollection", "features": features })
}
