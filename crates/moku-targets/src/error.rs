//! Error types for platform operations.

use std::path::PathBuf;

/// Errors that can occur while resolving, loading, or saving platforms.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading/writing platform files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform file not found.
    #[error("platform file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Name does not match any catalog platform.
    #[error("unknown platform: '{name}' (expected one of go, lab, pro, delta)")]
    UnknownPlatform {
        /// The name that failed to resolve.
        name: String,
    },

    /// Name does not match any instrument kind.
    #[error("unknown instrument: '{name}'")]
    UnknownInstrument {
        /// The name that failed to resolve.
        name: String,
    },

    /// Validation error in a platform definition.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, TargetError>;
