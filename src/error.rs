use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while exporting the scene.
///
/// None of these affect the scene or its history.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write document: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export worker stopped before finishing")]
    WorkerLost,

    #[error("Saving files is not supported on this platform")]
    Unsupported,
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
