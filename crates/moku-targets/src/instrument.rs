//! Instrument kinds and the virtual ports they expose inside a slot.
//!
//! Port exposure is split by direction: an instrument may consume signals
//! (slot inputs, `Slot<S>In<X>`), produce them (slot outputs, `Slot<S>Out<X>`),
//! or both. The letters available depend on the platform, so the catalog
//! builds each table from the platform's suffix range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TargetError;

/// The closed set of instruments that can occupy a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// User-programmable compute instrument loaded from a bitstream.
    CloudCompile,
    Oscilloscope,
    WaveformGenerator,
    ArbitraryWaveformGenerator,
    SpectrumAnalyzer,
    Datalogger,
    LockInAmp,
    PidController,
    Phasemeter,
    FrequencyResponseAnalyzer,
    DigitalFilterBox,
    LogicAnalyzer,
}

/// Which directions an instrument kind exposes ports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    /// Consumes signals only.
    InputsOnly,
    /// Produces signals only.
    OutputsOnly,
    /// Consumes and produces signals.
    Both,
}

impl InstrumentKind {
    /// Every instrument kind, in declaration order.
    pub const ALL: [InstrumentKind; 12] = [
        InstrumentKind::CloudCompile,
        InstrumentKind::Oscilloscope,
        InstrumentKind::WaveformGenerator,
        InstrumentKind::ArbitraryWaveformGenerator,
        InstrumentKind::SpectrumAnalyzer,
        InstrumentKind::Datalogger,
        InstrumentKind::LockInAmp,
        InstrumentKind::PidController,
        InstrumentKind::Phasemeter,
        InstrumentKind::FrequencyResponseAnalyzer,
        InstrumentKind::DigitalFilterBox,
        InstrumentKind::LogicAnalyzer,
    ];

    /// Canonical name, identical to the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            InstrumentKind::CloudCompile => "CloudCompile",
            InstrumentKind::Oscilloscope => "Oscilloscope",
            InstrumentKind::WaveformGenerator => "WaveformGenerator",
            InstrumentKind::ArbitraryWaveformGenerator => "ArbitraryWaveformGenerator",
            InstrumentKind::SpectrumAnalyzer => "SpectrumAnalyzer",
            InstrumentKind::Datalogger => "Datalogger",
            InstrumentKind::LockInAmp => "LockInAmp",
            InstrumentKind::PidController => "PidController",
            InstrumentKind::Phasemeter => "Phasemeter",
            InstrumentKind::FrequencyResponseAnalyzer => "FrequencyResponseAnalyzer",
            InstrumentKind::DigitalFilterBox => "DigitalFilterBox",
            InstrumentKind::LogicAnalyzer => "LogicAnalyzer",
        }
    }

    /// Whether this instrument takes a bitstream and control registers.
    pub fn is_programmable(self) -> bool {
        self == InstrumentKind::CloudCompile
    }

    /// Directions in which this instrument exposes slot ports.
    pub fn exposure(self) -> Exposure {
        match self {
            InstrumentKind::Oscilloscope
            | InstrumentKind::SpectrumAnalyzer
            | InstrumentKind::Datalogger
            | InstrumentKind::LogicAnalyzer => Exposure::InputsOnly,
            InstrumentKind::WaveformGenerator | InstrumentKind::ArbitraryWaveformGenerator => {
                Exposure::OutputsOnly
            }
            InstrumentKind::CloudCompile
            | InstrumentKind::LockInAmp
            | InstrumentKind::PidController
            | InstrumentKind::Phasemeter
            | InstrumentKind::FrequencyResponseAnalyzer
            | InstrumentKind::DigitalFilterBox => Exposure::Both,
        }
    }

    /// Build the port table entry for this instrument given the suffix
    /// letters a platform provides per slot.
    pub fn ports_with_suffixes(self, suffixes: &[char]) -> InstrumentPorts {
        let (inputs, outputs) = match self.exposure() {
            Exposure::InputsOnly => (suffixes.to_vec(), Vec::new()),
            Exposure::OutputsOnly => (Vec::new(), suffixes.to_vec()),
            Exposure::Both => (suffixes.to_vec(), suffixes.to_vec()),
        };
        InstrumentPorts {
            instrument: self,
            inputs,
            outputs,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstrumentKind {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| TargetError::UnknownInstrument { name: s.into() })
    }
}

/// The virtual port suffixes one instrument kind exposes in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstrumentPorts {
    /// The instrument this entry describes.
    pub instrument: InstrumentKind,
    /// Suffixes usable as `Slot<S>In<X>`.
    #[serde(default)]
    pub inputs: Vec<char>,
    /// Suffixes usable as `Slot<S>Out<X>`.
    #[serde(default)]
    pub outputs: Vec<char>,
}

impl InstrumentPorts {
    /// Whether `Slot<S>In<suffix>` exists for this instrument.
    pub fn exposes_input(&self, suffix: char) -> bool {
        self.inputs.contains(&suffix)
    }

    /// Whether `Slot<S>Out<suffix>` exists for this instrument.
    pub fn exposes_output(&self, suffix: char) -> bool {
        self.outputs.contains(&suffix)
    }

    /// True when the instrument exposes no ports at all.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in InstrumentKind::ALL {
            assert_eq!(kind.name().parse::<InstrumentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_rejected() {
        let err = "Multimeter".parse::<InstrumentKind>().unwrap_err();
        assert!(matches!(err, TargetError::UnknownInstrument { .. }));
        // Names are case-sensitive.
        assert!("oscilloscope".parse::<InstrumentKind>().is_err());
    }

    #[test]
    fn exposure_by_direction() {
        let scope = InstrumentKind::Oscilloscope.ports_with_suffixes(&['A', 'B']);
        assert!(scope.exposes_input('A'));
        assert!(!scope.exposes_output('A'));

        let wavegen = InstrumentKind::WaveformGenerator.ports_with_suffixes(&['A', 'B']);
        assert!(wavegen.inputs.is_empty());
        assert!(wavegen.exposes_output('B'));

        let cc = InstrumentKind::CloudCompile.ports_with_suffixes(&['A', 'B', 'C', 'D']);
        assert!(cc.exposes_input('D'));
        assert!(cc.exposes_output('D'));
        assert!(!cc.exposes_output('E'));
    }

    #[test]
    fn only_cloud_compile_is_programmable() {
        let programmable: Vec<_> = InstrumentKind::ALL
            .iter()
            .filter(|k| k.is_programmable())
            .collect();
        assert_eq!(programmable, vec![&InstrumentKind::CloudCompile]);
    }

    #[test]
    fn serialized_name_matches_display() {
        let json = serde_json::to_string(&InstrumentKind::LockInAmp).unwrap();
        assert_eq!(json, "\"LockInAmp\"");
        assert_eq!(InstrumentKind::LockInAmp.to_string(), "LockInAmp");
    }
}
