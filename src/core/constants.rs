//! Default parameters and supported file formats

/// Default maximum interpolation gap tolerance (seconds) - 1 hour
pub const DEFAULT_MAX_GAP_SECONDS: i64 = 3600;

/// Image file extensions handled by the scanner (lowercase, without dot)
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "heic", "heif", "png", "tiff", "tif", "dng", "arw", "cr2", "nef",
];
