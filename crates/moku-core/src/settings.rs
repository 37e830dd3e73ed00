//! Instrument settings as a capability-tagged variant.
//!
//! Instruments with a modeled settings schema carry a typed payload; unknown
//! keys for them are rejected at construction. Every other instrument keeps an
//! opaque key/value map.

use std::collections::BTreeMap;

use moku_targets::InstrumentKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SlotError;

/// Oscilloscope acquisition settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OscilloscopeSettings {
    /// Sample rate in samples per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    /// Start of the capture window relative to the trigger, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timebase_start: Option<f64>,
    /// End of the capture window relative to the trigger, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timebase_stop: Option<f64>,
    /// Trigger source, e.g. `"ChannelA"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
    /// Trigger level in volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_level: Option<f64>,
}

/// Basic waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Ramp,
    Pulse,
    Noise,
    DC,
}

/// Waveform generator output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveformGeneratorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Waveform>,
    /// Frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Peak-to-peak amplitude in volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f64>,
    /// DC offset in volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    /// Phase in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<f64>,
}

/// Spectrum analyzer sweep settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpectrumAnalyzerSettings {
    /// Sweep start frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frequency: Option<f64>,
    /// Sweep stop frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_frequency: Option<f64>,
    /// Resolution bandwidth in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbw: Option<f64>,
    /// Window function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

/// Per-instrument settings payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentSettings {
    Oscilloscope(OscilloscopeSettings),
    WaveformGenerator(WaveformGeneratorSettings),
    SpectrumAnalyzer(SpectrumAnalyzerSettings),
    /// Opaque settings for instruments without a modeled schema.
    Generic(BTreeMap<String, Value>),
}

impl InstrumentSettings {
    /// Empty settings of the right variant for `kind`.
    pub fn default_for(kind: InstrumentKind) -> Self {
        match kind {
            InstrumentKind::Oscilloscope => Self::Oscilloscope(Default::default()),
            InstrumentKind::WaveformGenerator => Self::WaveformGenerator(Default::default()),
            InstrumentKind::SpectrumAnalyzer => Self::SpectrumAnalyzer(Default::default()),
            _ => Self::Generic(BTreeMap::new()),
        }
    }

    /// Whether `kind` has a typed settings schema.
    pub fn is_modeled(kind: InstrumentKind) -> bool {
        !matches!(Self::default_for(kind), Self::Generic(_))
    }

    /// Convert a raw key/value map into the settings variant for `kind`.
    pub fn from_map(
        kind: InstrumentKind,
        map: BTreeMap<String, Value>,
    ) -> Result<Self, SlotError> {
        let object = Value::Object(map.clone().into_iter().collect());
        let invalid = |e: serde_json::Error| SlotError::InvalidSettings {
            instrument: kind,
            detail: e.to_string(),
        };
        Ok(match kind {
            InstrumentKind::Oscilloscope => {
                Self::Oscilloscope(serde_json::from_value(object).map_err(invalid)?)
            }
            InstrumentKind::WaveformGenerator => {
                Self::WaveformGenerator(serde_json::from_value(object).map_err(invalid)?)
            }
            InstrumentKind::SpectrumAnalyzer => {
                Self::SpectrumAnalyzer(serde_json::from_value(object).map_err(invalid)?)
            }
            _ => Self::Generic(map),
        })
    }

    /// Whether this payload may be attached to an instrument of `kind`.
    pub fn matches(&self, kind: InstrumentKind) -> bool {
        match self {
            Self::Oscilloscope(_) => kind == InstrumentKind::Oscilloscope,
            Self::WaveformGenerator(_) => kind == InstrumentKind::WaveformGenerator,
            Self::SpectrumAnalyzer(_) => kind == InstrumentKind::SpectrumAnalyzer,
            Self::Generic(_) => !Self::is_modeled(kind),
        }
    }

    /// Flatten to a key/value map; unset typed fields are omitted.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let value = match self {
            Self::Oscilloscope(s) => serde_json::to_value(s),
            Self::WaveformGenerator(s) => serde_json::to_value(s),
            Self::SpectrumAnalyzer(s) => serde_json::to_value(s),
            Self::Generic(map) => return map.clone(),
        };
        match value {
            Ok(Value::Object(object)) => object.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty()
    }
}
