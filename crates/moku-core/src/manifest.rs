//! Packaging manifest for custom CloudCompile instruments.
//!
//! A manifest carries just enough metadata to deploy a synthesized design as
//! an instrument: identity, version, how many of the wrapper's ports it uses,
//! and where its bitstream lives.

use std::fmt;
use std::path::Path;

use moku_targets::{InstrumentKind, InstrumentPorts};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::slot::{SlotSpec, WrapperPorts, MAX_WRAPPER_PORTS};

fn default_version() -> Version {
    Version::new(1, 0, 0)
}

fn default_outputs() -> u8 {
    MAX_WRAPPER_PORTS
}

/// Metadata for a packaged instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentManifest {
    /// Identifier, e.g. `pulsestar`.
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub author: String,
    #[serde(default = "default_version")]
    pub version: Version,
    /// Wrapper inputs in use (0-4).
    #[serde(default)]
    pub num_inputs: u8,
    /// Wrapper outputs in use (0-4).
    #[serde(default = "default_outputs")]
    pub num_outputs: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitstream_path: Option<String>,
}

impl InstrumentManifest {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            author: author.into(),
            version: default_version(),
            num_inputs: 0,
            num_outputs: default_outputs(),
            bitstream_path: None,
        }
    }

    /// Parse a version string and set it.
    pub fn with_version(mut self, version: &str) -> Result<Self, ManifestError> {
        self.version = Version::parse(version)?;
        Ok(self)
    }

    pub fn with_ports(mut self, num_inputs: u8, num_outputs: u8) -> Self {
        self.num_inputs = num_inputs;
        self.num_outputs = num_outputs;
        self
    }

    pub fn with_bitstream(mut self, path: impl Into<String>) -> Self {
        self.bitstream_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::Invalid {
                field: "name",
                detail: "must not be empty".into(),
            });
        }
        if self.display_name.trim().is_empty() {
            return Err(ManifestError::Invalid {
                field: "display_name",
                detail: "must not be empty".into(),
            });
        }
        for (field, count) in [("num_inputs", self.num_inputs), ("num_outputs", self.num_outputs)] {
            if count > MAX_WRAPPER_PORTS {
                return Err(ManifestError::Invalid {
                    field,
                    detail: format!("{count} exceeds {MAX_WRAPPER_PORTS}"),
                });
            }
        }
        Ok(())
    }

    pub fn wrapper_ports(&self) -> WrapperPorts {
        WrapperPorts {
            inputs: self.num_inputs,
            outputs: self.num_outputs,
        }
    }

    /// Slot port letters the instrument exposes, in wrapper order.
    pub fn exposed_ports(&self) -> InstrumentPorts {
        self.wrapper_ports().exposed()
    }

    /// A CloudCompile slot definition loading this instrument's bitstream.
    ///
    /// The slot is limited to the wrapper ports the manifest declares, so
    /// routing to an unused port is reported as not exposed.
    pub fn slot_spec(&self) -> SlotSpec {
        let spec = SlotSpec::new(InstrumentKind::CloudCompile)
            .with_wrapper_ports(self.num_inputs, self.num_outputs);
        match &self.bitstream_path {
            Some(path) => spec.with_bitstream(path.clone()),
            None => spec,
        }
    }

    /// Load and validate a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: InstrumentManifest = toml::from_str(&content)?;
        manifest.validate()?;
        tracing::debug!(path = %path.display(), name = %manifest.name, "loaded instrument manifest");
        Ok(manifest)
    }

    /// Validate and write the manifest as TOML.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        self.validate()?;
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl fmt::Display for InstrumentManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{}: {}IN/{}OUT",
            self.display_name, self.version, self.num_inputs, self.num_outputs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulsestar() -> InstrumentManifest {
        InstrumentManifest::new("pulsestar", "PulseStar", "Pulse sequencer", "Lab")
    }

    #[test]
    fn defaults() {
        let m: InstrumentManifest = toml::from_str(
            r#"
name = "pulsestar"
display_name = "PulseStar"
description = "Pulse sequencer"
author = "Lab"
"#,
        )
        .unwrap();
        assert_eq!(m, pulsestar());
        assert_eq!(m.version, Version::new(1, 0, 0));
        assert_eq!(m.num_inputs, 0);
        assert_eq!(m.num_outputs, 4);
        assert_eq!(m.to_string(), "PulseStar v1.0.0: 0IN/4OUT");
    }

    #[test]
    fn rejects_bad_version() {
        assert!(matches!(
            pulsestar().with_version("one"),
            Err(ManifestError::Version(_))
        ));
        let m = pulsestar().with_version("2.3.1-beta.1").unwrap();
        assert_eq!(m.to_string(), "PulseStar v2.3.1-beta.1: 0IN/4OUT");
    }

    #[test]
    fn port_count_limits() {
        assert!(pulsestar().with_ports(4, 4).validate().is_ok());
        match pulsestar().with_ports(5, 0).validate() {
            Err(ManifestError::Invalid { field, .. }) => assert_eq!(field, "num_inputs"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_name_invalid() {
        let m = InstrumentManifest::new(" ", "X", "", "");
        assert!(matches!(
            m.validate(),
            Err(ManifestError::Invalid { field: "name", .. })
        ));
    }

    #[test]
    fn exposed_ports_follow_counts() {
        let ports = pulsestar().with_ports(2, 3).exposed_ports();
        assert_eq!(ports.inputs, vec!['A', 'B']);
        assert_eq!(ports.outputs, vec!['A', 'B', 'C']);
        assert!(!ports.exposes_input('C'));
    }

    #[test]
    fn slot_spec_builds_with_bitstream() {
        let slot = pulsestar()
            .with_bitstream("pulsestar.tar")
            .slot_spec()
            .build()
            .unwrap();
        assert_eq!(slot.instrument(), InstrumentKind::CloudCompile);
        assert_eq!(slot.bitstream(), Some("pulsestar.tar"));
        assert_eq!(slot.wrapper_ports(), Some(pulsestar().wrapper_ports()));

        // Without a bitstream the slot cannot be deployed.
        assert!(pulsestar().slot_spec().build().is_err());
    }

    #[test]
    fn manifest_slot_routes_only_declared_ports() {
        use crate::routing::{validate, ErrorKind};
        use crate::MokuConnection;
        use moku_targets::PlatformId;
        use std::collections::BTreeMap;

        let slot = pulsestar()
            .with_ports(0, 2)
            .with_bitstream("pulsestar.tar")
            .slot_spec()
            .build()
            .unwrap();
        let mut slots = BTreeMap::new();
        slots.insert(1, slot);

        let routing = vec![
            MokuConnection::new("Slot1OutA", "Output1"),
            MokuConnection::new("Input1", "Slot1InA"),
            MokuConnection::new("Slot1OutC", "Output2"),
        ];
        let errors = validate(PlatformId::Pro.spec(), &slots, &routing);
        let found: Vec<_> = errors.iter().map(|e| (e.connection_index, e.kind)).collect();
        assert_eq!(
            found,
            vec![
                (Some(1), ErrorKind::PortNotExposed),
                (Some(2), ErrorKind::PortNotExposed),
            ]
        );
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulsestar.toml");
        let m = pulsestar()
            .with_ports(1, 2)
            .with_bitstream("out/pulsestar.tar")
            .with_version("1.2.0")
            .unwrap();
        m.save(&path).unwrap();
        assert_eq!(InstrumentManifest::load(&path).unwrap(), m);

        let bad = pulsestar().with_ports(0, 9);
        assert!(bad.save(&path).is_err());
    }
}
