//! Error types for mapview

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapviewError {
    // Document errors
    #[error("Invalid map document: {reason}")]
    InvalidDocument { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Export errors
    #[error("An export is already in progress")]
    ExportBusy,

    #[error("Export image decode failed: {reason}")]
    ExportDecode { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MapviewError>;
