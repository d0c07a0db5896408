//! Photo metadata access through the external `exiftool` program
//!
//! Exiftool stays the authoritative reader and writer of EXIF data; this
//! module shells out to it and converts between its JSON output and the
//! crate's data model.

pub mod metadata;
pub mod writer;

pub use metadata::{check_exiftool, read_photo_metadata};
pub use writer::{write_gps, write_matched};

use std::fmt;

/// Errors raised while invoking exiftool
#[derive(Debug, Clone, PartialEq)]
pub enum ExifError {
    ToolMissing { tool: String, message: String },
    CommandFailed { path: String, message: String },
    BadOutput { path: String, message: String },
}

impl fmt::Display for ExifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifError::ToolMissing { tool, message } => {
                write!(f, "exiftool not available ('{}'): {}", tool, message)
            }
            ExifError::CommandFailed { path, message } => {
                write!(f, "exiftool failed for '{}': {}", path, message)
            }
            ExifError::BadOutput { path, message } => {
                write!(f, "Unreadable exiftool output for '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ExifError {}
