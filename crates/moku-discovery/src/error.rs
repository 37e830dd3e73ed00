//! Device cache error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the device cache.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Filesystem failure at a known location.
    #[error("cache error at {}: {detail}", path.display())]
    CacheError { path: PathBuf, detail: String },

    /// Malformed cache contents.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to place the default cache in.
    #[error("cannot determine the default cache location (HOME is not set)")]
    NoHome,
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
