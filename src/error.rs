// Error types. Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors surfaced to `main`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("invalid color {0:?}: expected #RRGGBB, #AARRGGBB or gray/red/green/blue")]
    InvalidColor(String),
}

/// Conditions the mask engine absorbs locally; never fatal to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("invalid mask dimensions {width}x{height}")]
    InvalidDimension { width: usize, height: usize },
}
