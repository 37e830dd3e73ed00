//! The deployment configuration aggregate.
//!
//! A [`MokuConfig`] is built once from a platform, a slot assignment and a
//! routing list. Construction enforces the slot invariants; routing is only
//! checked on request by [`MokuConfig::validate_routing`], so a configuration
//! that is not fully wired yet can still be built, inspected and exported.

use std::collections::BTreeMap;
use std::path::Path;

use moku_targets::parse::ensure_valid;
use moku_targets::{InstrumentKind, PlatformSpec, TargetError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{ConnectionList, MokuConnection};
use crate::error::ConfigError;
use crate::export;
use crate::report::RoutingReport;
use crate::routing::{RoutingValidator, ValidationError};
use crate::slot::{parse_index_key, SlotConfig, SlotSpec};

/// Opaque deployment metadata, passed through unvalidated.
pub type Metadata = BTreeMap<String, Value>;

/// Platform selector in a configuration document.
///
/// A string names a catalog platform; a table is a full custom definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformRef {
    Named(String),
    Custom(PlatformSpec),
}

impl PlatformRef {
    /// Resolve to a concrete platform.
    pub fn resolve(self) -> Result<PlatformSpec, ConfigError> {
        match self {
            PlatformRef::Named(name) => Ok(PlatformSpec::resolve(&name)?.clone()),
            PlatformRef::Custom(spec) => Ok(spec),
        }
    }
}

/// Unvalidated configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSpec {
    pub platform: PlatformRef,
    /// Slots keyed by decimal slot index.
    #[serde(default)]
    pub slots: BTreeMap<String, SlotSpec>,
    #[serde(default)]
    pub routing: Vec<MokuConnection>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl ConfigSpec {
    /// Check every construction invariant and materialize the configuration.
    pub fn build(self) -> Result<MokuConfig, ConfigError> {
        let platform = self.platform.resolve()?;

        let mut slots = Vec::with_capacity(self.slots.len());
        for (key, spec) in self.slots {
            let slot = parse_index_key(&key)
                .ok_or_else(|| ConfigError::InvalidSlotKey { key: key.clone() })?;
            let config = spec
                .build()
                .map_err(|source| ConfigError::Slot { slot, source })?;
            slots.push((slot, config));
        }

        Ok(MokuConfig::new(platform, slots, self.routing)?.with_metadata(self.metadata))
    }
}

/// A validated deployment configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MokuConfig {
    platform: PlatformSpec,
    slots: BTreeMap<u32, SlotConfig>,
    routing: ConnectionList,
    metadata: Metadata,
}

impl MokuConfig {
    /// Build a configuration.
    ///
    /// Fails if the platform definition is invalid, no slot is configured, a
    /// slot index repeats or lies outside `1..=slot_count`, or a slot holds an
    /// instrument the platform cannot load.
    pub fn new(
        platform: PlatformSpec,
        slots: impl IntoIterator<Item = (u32, SlotConfig)>,
        routing: impl Into<ConnectionList>,
    ) -> Result<Self, ConfigError> {
        match ensure_valid(&platform) {
            Ok(_) => {}
            Err(TargetError::Validation { detail }) => {
                return Err(ConfigError::InvalidPlatform {
                    name: platform.name.clone(),
                    detail,
                })
            }
            Err(e) => return Err(e.into()),
        }

        let mut map = BTreeMap::new();
        for (slot, config) in slots {
            if map.insert(slot, config).is_some() {
                return Err(ConfigError::DuplicateSlot { slot });
            }
        }
        if map.is_empty() {
            return Err(ConfigError::NoSlots);
        }

        for (&slot, config) in &map {
            if !platform.has_slot(slot) {
                return Err(ConfigError::SlotOutOfRange {
                    slot,
                    max: platform.slot_count,
                    platform: platform.name.clone(),
                });
            }
            if !platform.supports(config.instrument()) {
                return Err(ConfigError::UnsupportedInstrument {
                    slot,
                    instrument: config.instrument(),
                    platform: platform.name.clone(),
                });
            }
        }

        let routing: ConnectionList = routing.into();
        tracing::debug!(
            platform = %platform.name,
            slots = map.len(),
            connections = routing.len(),
            "built deployment config"
        );

        Ok(Self {
            platform,
            slots: map,
            routing,
            metadata: Metadata::new(),
        })
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn platform(&self) -> &PlatformSpec {
        &self.platform
    }

    pub fn slots(&self) -> &BTreeMap<u32, SlotConfig> {
        &self.slots
    }

    pub fn routing(&self) -> &ConnectionList {
        &self.routing
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn get_slot(&self, slot: u32) -> Option<&SlotConfig> {
        self.slots.get(&slot)
    }

    /// Indices of the slots holding `kind`, ascending.
    pub fn instrument_slots(&self, kind: InstrumentKind) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|(_, config)| config.instrument() == kind)
            .map(|(&slot, _)| slot)
            .collect()
    }

    /// Check the routing against the platform and slots.
    ///
    /// Never fails; an empty list means the routing is valid.
    pub fn validate_routing(&self) -> Vec<ValidationError> {
        RoutingValidator::new(&self.platform, &self.slots).validate(self.routing.as_slice())
    }

    pub fn routing_report(&self) -> RoutingReport {
        RoutingReport::new(self.routing.len(), self.validate_routing())
    }

    /// Export as a nested generic structure. Does not validate routing.
    pub fn to_dict(&self) -> Value {
        export::to_dict(self)
    }

    /// SHA-256 of the canonical export.
    pub fn fingerprint(&self) -> String {
        export::fingerprint(&self.to_dict())
    }

    /// Project back to the document form.
    ///
    /// Catalog platforms are referenced by name; custom platforms are inlined.
    pub fn to_spec(&self) -> ConfigSpec {
        let platform = match self.platform.catalog_id() {
            Some(id) if id.spec() == &self.platform => PlatformRef::Named(id.as_str().into()),
            _ => PlatformRef::Custom(self.platform.clone()),
        };
        ConfigSpec {
            platform,
            slots: self
                .slots
                .iter()
                .map(|(slot, config)| (slot.to_string(), config.to_spec()))
                .collect(),
            routing: self.routing.iter().cloned().collect(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild from a [`MokuConfig::to_dict`] export or an equivalent structure.
    pub fn from_dict(value: &Value) -> Result<Self, ConfigError> {
        ConfigSpec::deserialize(value)?.build()
    }
}

/// Load a deployment configuration from a TOML file.
pub fn load_config_toml(path: &Path) -> Result<MokuConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let config = parse_config_toml(&content)?;
    tracing::debug!(path = %path.display(), "loaded deployment config");
    Ok(config)
}

/// Parse a deployment configuration from a TOML string.
pub fn parse_config_toml(toml_str: &str) -> Result<MokuConfig, ConfigError> {
    let spec: ConfigSpec = toml::from_str(toml_str)?;
    spec.build()
}

/// Serialize a configuration to pretty TOML.
pub fn config_to_toml(config: &MokuConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(&config.to_spec())?)
}
