//! Construction-time error types.
//!
//! These errors mean an object could not be built. Routing problems on a
//! successfully built configuration are data, see [`crate::routing`].

use std::path::PathBuf;

use moku_targets::{InstrumentKind, TargetError};

/// A slot definition that cannot be turned into a [`crate::SlotConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("instrument name cannot be empty")]
    EmptyInstrument,

    #[error("unknown instrument '{name}'")]
    UnknownInstrument { name: String },

    #[error("{instrument} requires a bitstream")]
    MissingBitstream { instrument: InstrumentKind },

    #[error("field '{field}' is not allowed for {instrument} (CloudCompile only)")]
    FieldNotAllowed {
        field: &'static str,
        instrument: InstrumentKind,
    },

    #[error("control register key '{key}' is not an integer")]
    InvalidRegisterIndex { key: String },

    #[error("control register index {index} out of range (0-31)")]
    RegisterIndexOutOfRange { index: u32 },

    #[error("control register {index} is specified more than once")]
    DuplicateRegister { index: u32 },

    #[error("control register {index} value {value} does not fit in 32 bits")]
    RegisterValueOutOfRange { index: u32, value: i64 },

    #[error("wrapper ports {inputs}IN/{outputs}OUT exceed the wrapper's 4 per direction")]
    WrapperPortsOutOfRange { inputs: u8, outputs: u8 },

    #[error("invalid settings for {instrument}: {detail}")]
    InvalidSettings {
        instrument: InstrumentKind,
        detail: String,
    },
}

impl SlotError {
    /// The slot field this error is attributed to.
    pub fn field(&self) -> &'static str {
        match self {
            SlotError::EmptyInstrument | SlotError::UnknownInstrument { .. } => "instrument",
            SlotError::MissingBitstream { .. } => "bitstream",
            SlotError::FieldNotAllowed { field, .. } => *field,
            SlotError::InvalidRegisterIndex { .. }
            | SlotError::RegisterIndexOutOfRange { .. }
            | SlotError::DuplicateRegister { .. }
            | SlotError::RegisterValueOutOfRange { .. } => "control_registers",
            SlotError::InvalidSettings { .. } => "settings",
            SlotError::WrapperPortsOutOfRange { .. } => "wrapper_ports",
        }
    }
}

/// A configuration that cannot be turned into a [`crate::MokuConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one slot must be configured")]
    NoSlots,

    #[error("slot {slot} out of range for {platform} (1-{max})")]
    SlotOutOfRange {
        slot: u32,
        max: u32,
        platform: String,
    },

    #[error("slot {slot} is configured more than once")]
    DuplicateSlot { slot: u32 },

    #[error("slot key '{key}' is not a slot number")]
    InvalidSlotKey { key: String },

    #[error("slot {slot}: {source}")]
    Slot { slot: u32, source: SlotError },

    #[error("slot {slot}: {instrument} is not available on {platform}")]
    UnsupportedInstrument {
        slot: u32,
        instrument: InstrumentKind,
        platform: String,
    },

    #[error("invalid platform '{name}': {detail}")]
    InvalidPlatform { name: String, detail: String },

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },
}

impl ConfigError {
    /// Dotted path of the offending field, when the error is attributable to one.
    pub fn field(&self) -> Option<String> {
        match self {
            ConfigError::NoSlots | ConfigError::InvalidSlotKey { .. } => Some("slots".into()),
            ConfigError::SlotOutOfRange { slot, .. } | ConfigError::DuplicateSlot { slot } => {
                Some(format!("slots.{slot}"))
            }
            ConfigError::Slot { slot, source } => Some(format!("slots.{slot}.{}", source.field())),
            ConfigError::UnsupportedInstrument { slot, .. } => {
                Some(format!("slots.{slot}.instrument"))
            }
            ConfigError::InvalidPlatform { .. } | ConfigError::Target(_) => {
                Some("platform".into())
            }
            _ => None,
        }
    }
}

/// Errors loading or validating an [`crate::InstrumentManifest`].
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid manifest field '{field}': {detail}")]
    Invalid { field: &'static str, detail: String },

    #[error("invalid version: {0}")]
    Version(#[from] semver::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
