use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Row {row} has no value for column {column}")]
    MissingValue { column: &'static str, row: usize },

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid value {value:?} for column {column}")]
    InvalidValue { column: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),
}

impl GalleryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GalleryError::MissingValue { .. } => "MISSING_VALUE",
            GalleryError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            GalleryError::InvalidValue { .. } => "INVALID_VALUE",
            GalleryError::Config(_) => "CONFIG_ERROR",
            GalleryError::Font(_) => "FONT_ERROR",
            GalleryError::Io(_) => "IO_ERROR",
            GalleryError::Csv(_) => "CSV_ERROR",
            GalleryError::Json(_) => "JSON_ERROR",
            GalleryError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
        }
    }
}
