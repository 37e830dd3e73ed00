//! Slot configuration: which instrument occupies a slot and how it is set up.
//!
//! Building a [`SlotConfig`] is two-phase: a [`SlotSpec`] candidate (what a
//! document or caller supplies) is checked by [`SlotSpec::build`], and only a
//! fully consistent slot is materialized. A built `SlotConfig` is immutable.

use std::collections::BTreeMap;

use moku_targets::{InstrumentKind, InstrumentPorts};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SlotError;
use crate::settings::InstrumentSettings;

/// Number of control registers exposed by a CloudCompile instrument.
pub const CONTROL_REGISTER_COUNT: u32 = 32;

/// Ports available on the CloudCompile wrapper in each direction.
pub const MAX_WRAPPER_PORTS: u8 = 4;

/// Parse a decimal index key. Only ASCII digits are accepted, so `"03"` is 3
/// but `"+3"` and `"-0"` are rejected.
pub(crate) fn parse_index_key(key: &str) -> Option<u32> {
    let key = key.trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Wrapper ports a packaged CloudCompile design actually uses.
///
/// Letters are assigned in order from `A`, so `inputs = 2` exposes
/// `Slot<S>InA` and `Slot<S>InB` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperPorts {
    pub inputs: u8,
    pub outputs: u8,
}

impl WrapperPorts {
    pub fn exposes_input(&self, suffix: char) -> bool {
        letter_index(suffix).is_some_and(|i| i < self.inputs)
    }

    pub fn exposes_output(&self, suffix: char) -> bool {
        letter_index(suffix).is_some_and(|i| i < self.outputs)
    }

    /// The same restriction as a CloudCompile port table.
    pub fn exposed(&self) -> InstrumentPorts {
        let letters = |n: u8| (0..n).map(|i| char::from(b'A' + i)).collect();
        InstrumentPorts {
            instrument: InstrumentKind::CloudCompile,
            inputs: letters(self.inputs),
            outputs: letters(self.outputs),
        }
    }
}

fn letter_index(suffix: char) -> Option<u8> {
    suffix.is_ascii_uppercase().then(|| suffix as u8 - b'A')
}

/// Validated CloudCompile control register values, keyed by index (0-31).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlRegisters(BTreeMap<u8, u32>);

impl ControlRegisters {
    /// Build from (index, value) pairs, rejecting out-of-range or repeated indices.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u32)>) -> Result<Self, SlotError> {
        let mut registers = BTreeMap::new();
        for (index, value) in pairs {
            if index >= CONTROL_REGISTER_COUNT {
                return Err(SlotError::RegisterIndexOutOfRange { index });
            }
            if registers.insert(index as u8, value).is_some() {
                return Err(SlotError::DuplicateRegister { index });
            }
        }
        Ok(Self(registers))
    }

    pub fn get(&self, index: u8) -> Option<u32> {
        self.0.get(&index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Unvalidated slot definition, as read from a document or assembled by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Instrument name (e.g., "CloudCompile", "Oscilloscope").
    pub instrument: String,
    /// Bitstream path (CloudCompile only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitstream: Option<String>,
    /// Control register values keyed by decimal index (CloudCompile only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_registers: Option<BTreeMap<String, i64>>,
    /// Instrument-specific settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,
    /// Wrapper ports in use (CloudCompile only); all platform ports when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper_ports: Option<WrapperPorts>,
}

impl SlotSpec {
    pub fn new(instrument: InstrumentKind) -> Self {
        Self {
            instrument: instrument.name().into(),
            ..Default::default()
        }
    }

    pub fn with_bitstream(mut self, path: impl Into<String>) -> Self {
        self.bitstream = Some(path.into());
        self
    }

    pub fn with_register(mut self, index: u32, value: u32) -> Self {
        self.control_registers
            .get_or_insert_with(BTreeMap::new)
            .insert(index.to_string(), i64::from(value));
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_wrapper_ports(mut self, inputs: u8, outputs: u8) -> Self {
        self.wrapper_ports = Some(WrapperPorts { inputs, outputs });
        self
    }

    /// Check every slot invariant and materialize the slot.
    pub fn build(self) -> Result<SlotConfig, SlotError> {
        let name = self.instrument.trim();
        if name.is_empty() {
            return Err(SlotError::EmptyInstrument);
        }
        let instrument: InstrumentKind = name
            .parse()
            .map_err(|_| SlotError::UnknownInstrument { name: name.into() })?;

        let bitstream = self
            .bitstream
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        if instrument.is_programmable() {
            if bitstream.is_none() {
                return Err(SlotError::MissingBitstream { instrument });
            }
        } else {
            if bitstream.is_some() {
                return Err(SlotError::FieldNotAllowed {
                    field: "bitstream",
                    instrument,
                });
            }
            if self.control_registers.is_some() {
                return Err(SlotError::FieldNotAllowed {
                    field: "control_registers",
                    instrument,
                });
            }
            if self.wrapper_ports.is_some() {
                return Err(SlotError::FieldNotAllowed {
                    field: "wrapper_ports",
                    instrument,
                });
            }
        }

        if let Some(WrapperPorts { inputs, outputs }) = self.wrapper_ports {
            if inputs > MAX_WRAPPER_PORTS || outputs > MAX_WRAPPER_PORTS {
                return Err(SlotError::WrapperPortsOutOfRange { inputs, outputs });
            }
        }

        let control_registers = match self.control_registers {
            Some(raw) => Some(normalize_registers(raw)?),
            None => None,
        };
        let settings = InstrumentSettings::from_map(instrument, self.settings)?;

        Ok(SlotConfig {
            instrument,
            bitstream,
            control_registers,
            settings,
            wrapper_ports: self.wrapper_ports,
        })
    }
}

/// Parse string-keyed register entries; `"3"` and `"03"` name the same register.
fn normalize_registers(raw: BTreeMap<String, i64>) -> Result<ControlRegisters, SlotError> {
    let mut pairs = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        let index = parse_index_key(&key)
            .ok_or_else(|| SlotError::InvalidRegisterIndex { key: key.clone() })?;
        let value =
            u32::try_from(value).map_err(|_| SlotError::RegisterValueOutOfRange { index, value })?;
        pairs.push((index, value));
    }
    ControlRegisters::from_pairs(pairs)
}

/// A validated, immutable slot assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotConfig {
    instrument: InstrumentKind,
    bitstream: Option<String>,
    control_registers: Option<ControlRegisters>,
    settings: InstrumentSettings,
    wrapper_ports: Option<WrapperPorts>,
}

impl SlotConfig {
    /// A fixed-function instrument with default settings.
    ///
    /// Fails for CloudCompile, which needs a bitstream; use [`SlotConfig::cloud_compile`].
    pub fn new(instrument: InstrumentKind) -> Result<Self, SlotError> {
        SlotSpec::new(instrument).build()
    }

    /// A CloudCompile slot with a bitstream and optional register values.
    pub fn cloud_compile(
        bitstream: impl Into<String>,
        registers: impl IntoIterator<Item = (u32, u32)>,
    ) -> Result<Self, SlotError> {
        let mut slot = SlotSpec::new(InstrumentKind::CloudCompile)
            .with_bitstream(bitstream)
            .build()?;
        let registers = ControlRegisters::from_pairs(registers)?;
        if !registers.is_empty() {
            slot.control_registers = Some(registers);
        }
        Ok(slot)
    }

    /// Replace the settings payload; it must match the instrument kind.
    pub fn with_settings(self, settings: InstrumentSettings) -> Result<Self, SlotError> {
        if !settings.matches(self.instrument) {
            return Err(SlotError::InvalidSettings {
                instrument: self.instrument,
                detail: "settings payload belongs to a different instrument".into(),
            });
        }
        Ok(Self { settings, ..self })
    }

    pub fn instrument(&self) -> InstrumentKind {
        self.instrument
    }

    pub fn bitstream(&self) -> Option<&str> {
        self.bitstream.as_deref()
    }

    pub fn control_registers(&self) -> Option<&ControlRegisters> {
        self.control_registers.as_ref()
    }

    pub fn settings(&self) -> &InstrumentSettings {
        &self.settings
    }

    pub fn wrapper_ports(&self) -> Option<WrapperPorts> {
        self.wrapper_ports
    }

    /// Project back to the unvalidated form.
    pub fn to_spec(&self) -> SlotSpec {
        SlotSpec {
            instrument: self.instrument.name().into(),
            bitstream: self.bitstream.clone(),
            control_registers: self.control_registers.as_ref().map(|regs| {
                regs.iter()
                    .map(|(i, v)| (i.to_string(), i64::from(v)))
                    .collect()
            }),
            settings: self.settings.to_map(),
            wrapper_ports: self.wrapper_ports,
        }
    }
}
