//! Deployment configuration models for Moku multi-instrument platforms.
//!
//! A [`MokuConfig`] assigns instruments to the slots of a platform and lists
//! the signal connections of the routing matrix between slot ports and
//! physical ports. Construction rejects configurations whose slots are
//! malformed; routing problems are reported, not raised, by
//! [`MokuConfig::validate_routing`].
//!
//! ```text
//! PlatformSpec ─┐
//! SlotConfig ───┼─> MokuConfig ──validate_routing──> Vec<ValidationError>
//! MokuConnection┘        └────────to_dict─────────> serde_json::Value
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod manifest;
pub mod port;
pub mod report;
pub mod routing;
pub mod settings;
pub mod slot;

pub use config::{ConfigSpec, Metadata, MokuConfig, PlatformRef};
pub use connection::{ConnectionList, MokuConnection};
pub use error::{ConfigError, ManifestError, SlotError};
pub use manifest::InstrumentManifest;
pub use port::{PortAddress, PortKind, PortParseError, PortRole};
pub use report::RoutingReport;
pub use routing::{ConnectionField, ErrorKind, RoutingValidator, ValidationError};
pub use settings::InstrumentSettings;
pub use slot::{ControlRegisters, SlotConfig, SlotSpec, WrapperPorts};

pub use moku_targets::{InstrumentKind, PlatformId, PlatformSpec};
