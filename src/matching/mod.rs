//! Temporal matching of photo timestamps against a GPS track

pub mod interpolate;
pub mod matcher;

pub use interpolate::interpolate;
pub use matcher::match_photos;
