//! Platform topology model and the predefined catalog.
//!
//! A [`PlatformSpec`] is plain data. The four catalog entries are built once
//! per process and handed out as `&'static` references; custom platforms are
//! ordinary owned values (see [`crate::parse`]).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::TargetError;
use crate::hardware::{AnalogFrontEnd, DioCharacteristics};
use crate::instrument::{InstrumentKind, InstrumentPorts};

/// Spelling used for physical channel identifiers on a platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhysicalNaming {
    /// `Input<N>` / `Output<N>`, used by the two-channel platforms.
    #[default]
    Legacy,
    /// `IN<N>` / `OUT<N>`, used by the extended-channel platforms.
    Extended,
}

impl PhysicalNaming {
    /// Identifier of physical input channel `n`.
    pub fn input_name(self, n: u32) -> String {
        match self {
            PhysicalNaming::Legacy => format!("Input{n}"),
            PhysicalNaming::Extended => format!("IN{n}"),
        }
    }

    /// Identifier of physical output channel `n`.
    pub fn output_name(self, n: u32) -> String {
        match self {
            PhysicalNaming::Legacy => format!("Output{n}"),
            PhysicalNaming::Extended => format!("OUT{n}"),
        }
    }
}

/// Identifier of a predefined catalog platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformId {
    Go,
    Lab,
    Pro,
    Delta,
}

impl PlatformId {
    /// All catalog platforms, in catalog order.
    pub const ALL: [PlatformId; 4] = [
        PlatformId::Go,
        PlatformId::Lab,
        PlatformId::Pro,
        PlatformId::Delta,
    ];

    /// Short identifier (`go`, `lab`, `pro`, `delta`).
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformId::Go => "go",
            PlatformId::Lab => "lab",
            PlatformId::Pro => "pro",
            PlatformId::Delta => "delta",
        }
    }

    /// The shared, read-only catalog entry for this platform.
    pub fn spec(self) -> &'static PlatformSpec {
        let catalog = PlatformSpec::catalog();
        match self {
            PlatformId::Go => &catalog[0],
            PlatformId::Lab => &catalog[1],
            PlatformId::Pro => &catalog[2],
            PlatformId::Delta => &catalog[3],
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = TargetError;

    /// Accepts the short id, the display name, or the hardware id,
    /// case-insensitively (`go`, `Moku:Go`, `mokugo`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PlatformId::ALL
            .iter()
            .copied()
            .find(|id| {
                let spec = id.spec();
                needle == id.as_str()
                    || needle == spec.name.to_ascii_lowercase()
                    || needle == spec.hardware_id
            })
            .ok_or_else(|| TargetError::UnknownPlatform { name: s.into() })
    }
}

/// Topology of a Moku platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSpec {
    /// Display name (e.g., "Moku:Go").
    pub name: String,
    /// Hardware identifier used by the vendor library (e.g., "mokugo").
    pub hardware_id: String,
    /// User-assigned name of a specific unit (e.g., "MokuB106").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Network address of a specific unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Number of multi-instrument slots.
    pub slot_count: u32,
    /// Number of physical analog inputs.
    pub analog_input_count: u32,
    /// Number of physical analog outputs.
    pub analog_output_count: u32,
    /// System clock rate in Hz.
    pub clock_rate_hz: u64,
    /// Digital I/O header pins (0 when the platform has no header).
    #[serde(default)]
    pub digital_io_pin_count: u32,
    /// Canonical spelling of physical channel identifiers.
    #[serde(default)]
    pub port_naming: PhysicalNaming,
    /// ADC/DAC characteristics, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analog_front_end: Option<AnalogFrontEnd>,
    /// DIO header characteristics, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dio_characteristics: Option<DioCharacteristics>,
    /// Instruments this platform can load, with their slot port suffixes.
    #[serde(default)]
    pub instrument_ports: Vec<InstrumentPorts>,
}

static CATALOG: OnceLock<[PlatformSpec; 4]> = OnceLock::new();

const TWO_PORT_SUFFIXES: [char; 2] = ['A', 'B'];
const FOUR_PORT_SUFFIXES: [char; 4] = ['A', 'B', 'C', 'D'];

impl PlatformSpec {
    /// Assemble a platform in which every instrument kind is available
    /// with the same suffix range.
    #[allow(clippy::too_many_arguments)]
    pub fn uniform(
        name: impl Into<String>,
        hardware_id: impl Into<String>,
        slot_count: u32,
        analog_input_count: u32,
        analog_output_count: u32,
        clock_rate_hz: u64,
        digital_io_pin_count: u32,
        port_naming: PhysicalNaming,
        suffixes: &[char],
    ) -> Self {
        Self {
            name: name.into(),
            hardware_id: hardware_id.into(),
            device_name: None,
            ip_address: None,
            slot_count,
            analog_input_count,
            analog_output_count,
            clock_rate_hz,
            digital_io_pin_count,
            port_naming,
            analog_front_end: None,
            dio_characteristics: None,
            instrument_ports: InstrumentKind::ALL
                .iter()
                .map(|k| k.ports_with_suffixes(suffixes))
                .collect(),
        }
    }

    /// Moku:Go: 2 slots, 2 in / 2 out, 125 MHz, 16-pin DIO header.
    pub fn moku_go() -> Self {
        Self {
            analog_front_end: Some(AnalogFrontEnd::moku_go()),
            dio_characteristics: Some(DioCharacteristics::moku_go()),
            ..Self::uniform(
                "Moku:Go",
                "mokugo",
                2,
                2,
                2,
                125_000_000,
                16,
                PhysicalNaming::Legacy,
                &TWO_PORT_SUFFIXES,
            )
        }
    }

    /// Moku:Lab: 2 slots, 2 in / 2 out, 500 MHz.
    pub fn moku_lab() -> Self {
        Self::uniform(
            "Moku:Lab",
            "mokulab",
            2,
            2,
            2,
            500_000_000,
            0,
            PhysicalNaming::Legacy,
            &TWO_PORT_SUFFIXES,
        )
    }

    /// Moku:Pro: 4 slots, 4 in / 4 out, 1.25 GHz.
    pub fn moku_pro() -> Self {
        Self::uniform(
            "Moku:Pro",
            "mokupro",
            4,
            4,
            4,
            1_250_000_000,
            0,
            PhysicalNaming::Extended,
            &FOUR_PORT_SUFFIXES,
        )
    }

    /// Moku:Delta: 4 slots, 8 in / 8 out, 5 GHz, 32-pin DIO header.
    pub fn moku_delta() -> Self {
        Self::uniform(
            "Moku:Delta",
            "mokudelta",
            4,
            8,
            8,
            5_000_000_000,
            32,
            PhysicalNaming::Extended,
            &FOUR_PORT_SUFFIXES,
        )
    }

    /// The predefined catalog, initialized on first use and never mutated.
    pub fn catalog() -> &'static [PlatformSpec; 4] {
        CATALOG.get_or_init(|| {
            [
                Self::moku_go(),
                Self::moku_lab(),
                Self::moku_pro(),
                Self::moku_delta(),
            ]
        })
    }

    /// Resolve a catalog platform by id, display name, or hardware id.
    pub fn resolve(name: &str) -> crate::Result<&'static PlatformSpec> {
        name.parse::<PlatformId>().map(PlatformId::spec)
    }

    /// The catalog id of this platform, if it is one of the predefined ones.
    pub fn catalog_id(&self) -> Option<PlatformId> {
        PlatformId::ALL
            .iter()
            .copied()
            .find(|id| id.spec().hardware_id == self.hardware_id)
    }

    /// Attach the identity of a specific unit.
    pub fn with_device(mut self, device_name: Option<String>, ip_address: Option<String>) -> Self {
        self.device_name = device_name;
        self.ip_address = ip_address;
        self
    }

    /// Clock period in nanoseconds.
    pub fn clock_period_ns(&self) -> f64 {
        1e9 / self.clock_rate_hz as f64
    }

    /// Port table entry for an instrument, if the platform supports it.
    pub fn instrument_ports(&self, kind: InstrumentKind) -> Option<&InstrumentPorts> {
        self.instrument_ports.iter().find(|p| p.instrument == kind)
    }

    /// Whether the instrument can be loaded into a slot of this platform.
    pub fn supports(&self, kind: InstrumentKind) -> bool {
        self.instrument_ports(kind).is_some()
    }

    /// Whether `slot` is a valid 1-based slot index on this platform.
    pub fn has_slot(&self, slot: u32) -> bool {
        (1..=self.slot_count).contains(&slot)
    }

    /// Canonical names of every physical port, inputs first.
    pub fn physical_port_names(&self) -> Vec<String> {
        let inputs = (1..=self.analog_input_count).map(|n| self.port_naming.input_name(n));
        let outputs = (1..=self.analog_output_count).map(|n| self.port_naming.output_name(n));
        inputs.chain(outputs).collect()
    }
}

impl fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(device) = &self.device_name {
            write!(f, " ({device})")?;
        }
        if let Some(ip) = &self.ip_address {
            write!(f, " @ {ip}")?;
        }
        write!(
            f,
            ": {}IN/{}OUT, {}DIO, {} slots",
            self.analog_input_count,
            self.analog_output_count,
            self.digital_io_pin_count,
            self.slot_count
        )
    }
}
