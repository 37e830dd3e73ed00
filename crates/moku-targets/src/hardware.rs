//! Electrical description of a platform's physical connectors.
//!
//! The analog port and DIO header records are derived from a
//! [`PlatformSpec`]: the channel and pin counts decide which records exist,
//! and the optional front-end data fills in their characteristics. Routing
//! never reads these records.

use serde::{Deserialize, Serialize};

use crate::platform::PlatformSpec;

/// Physical connector of a port or header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connector {
    #[serde(rename = "BNC")]
    Bnc,
    #[serde(rename = "ribbon_cable")]
    RibbonCable,
}

/// Signal direction of a physical analog port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// ADC or DAC characteristics shared by every channel in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalogCharacteristics {
    /// Converter bit depth.
    pub resolution_bits: u32,
    /// Sample rate in MSa/s.
    pub sample_rate_msa: u32,
    /// Peak-to-peak voltage range in volts.
    pub voltage_range_vpp: f64,
    /// Nominal impedance, e.g. "1MOhm" or "50Ohm".
    pub impedance: String,
}

/// Analog front end of a platform, per direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalogFrontEnd {
    pub input: AnalogCharacteristics,
    pub output: AnalogCharacteristics,
}

/// Electrical characteristics of a DIO header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DioCharacteristics {
    /// Nominal logic level, e.g. "3.3V".
    pub logic_level: String,
    /// Highest tolerated input voltage, e.g. "5V".
    pub voltage_tolerant: String,
    pub sample_rate_msa: u32,
    pub connector: Connector,
}

/// One physical analog port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalogPort {
    /// Canonical identifier on its platform, e.g. "Input1" or "IN1".
    pub port_id: String,
    pub connector: Connector,
    pub direction: PortDirection,
    /// `None` when the platform carries no front-end data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<AnalogCharacteristics>,
}

/// The digital I/O header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DioHeader {
    pub num_pins: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<DioCharacteristics>,
}

impl AnalogFrontEnd {
    /// Moku:Go: 12-bit at 125 MSa/s, 50 Vpp into 1 MOhm in, 10 Vpp from 50 Ohm out.
    pub fn moku_go() -> Self {
        Self {
            input: AnalogCharacteristics {
                resolution_bits: 12,
                sample_rate_msa: 125,
                voltage_range_vpp: 50.0,
                impedance: "1MOhm".into(),
            },
            output: AnalogCharacteristics {
                resolution_bits: 12,
                sample_rate_msa: 125,
                voltage_range_vpp: 10.0,
                impedance: "50Ohm".into(),
            },
        }
    }
}

impl DioCharacteristics {
    /// Moku:Go ribbon-cable header: 3.3 V logic, 5 V tolerant, 125 MSa/s.
    pub fn moku_go() -> Self {
        Self {
            logic_level: "3.3V".into(),
            voltage_tolerant: "5V".into(),
            sample_rate_msa: 125,
            connector: Connector::RibbonCable,
        }
    }
}

/// Channel number of `id` if it names a physical port in one of two spellings
/// (`Input3` / `IN3`). Leading zeros are not accepted.
fn channel_number(id: &str, long: &str, short: &str) -> Option<u32> {
    let digits = id.strip_prefix(long).or_else(|| id.strip_prefix(short))?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl PlatformSpec {
    fn analog_port(&self, direction: PortDirection, n: u32) -> AnalogPort {
        let (port_id, characteristics) = match direction {
            PortDirection::Input => (
                self.port_naming.input_name(n),
                self.analog_front_end.as_ref().map(|fe| fe.input.clone()),
            ),
            PortDirection::Output => (
                self.port_naming.output_name(n),
                self.analog_front_end.as_ref().map(|fe| fe.output.clone()),
            ),
        };
        AnalogPort {
            port_id,
            connector: Connector::Bnc,
            direction,
            characteristics,
        }
    }

    /// Physical analog inputs, one record per channel.
    pub fn analog_inputs(&self) -> Vec<AnalogPort> {
        (1..=self.analog_input_count)
            .map(|n| self.analog_port(PortDirection::Input, n))
            .collect()
    }

    /// Physical analog outputs, one record per channel.
    pub fn analog_outputs(&self) -> Vec<AnalogPort> {
        (1..=self.analog_output_count)
            .map(|n| self.analog_port(PortDirection::Output, n))
            .collect()
    }

    /// Look up an analog input by id, in either spelling (`Input1`, `IN1`).
    pub fn analog_input_by_id(&self, port_id: &str) -> Option<AnalogPort> {
        let n = channel_number(port_id.trim(), "Input", "IN")?;
        (n <= self.analog_input_count).then(|| self.analog_port(PortDirection::Input, n))
    }

    /// Look up an analog output by id, in either spelling (`Output1`, `OUT1`).
    pub fn analog_output_by_id(&self, port_id: &str) -> Option<AnalogPort> {
        let n = channel_number(port_id.trim(), "Output", "OUT")?;
        (n <= self.analog_output_count).then(|| self.analog_port(PortDirection::Output, n))
    }

    /// The DIO header, or `None` for platforms without one.
    pub fn dio_header(&self) -> Option<DioHeader> {
        (self.digital_io_pin_count > 0).then(|| DioHeader {
            num_pins: self.digital_io_pin_count,
            characteristics: self.dio_characteristics.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformId;

    #[test]
    fn go_analog_ports() {
        let go = PlatformId::Go.spec();
        let inputs = go.analog_inputs();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].port_id, "Input1");
        assert_eq!(inputs[0].connector, Connector::Bnc);
        assert_eq!(inputs[0].direction, PortDirection::Input);
        let adc = inputs[0].characteristics.as_ref().unwrap();
        assert_eq!(adc.resolution_bits, 12);
        assert_eq!(adc.voltage_range_vpp, 50.0);
        assert_eq!(adc.impedance, "1MOhm");

        let outputs = go.analog_outputs();
        assert_eq!(outputs[1].port_id, "Output2");
        assert_eq!(outputs[1].characteristics.as_ref().unwrap().impedance, "50Ohm");
    }

    #[test]
    fn port_counts_decide_records() {
        let mut go = PlatformSpec::moku_go();
        go.analog_input_count = 4;
        assert_eq!(go.analog_inputs().len(), 4);
        assert_eq!(go.analog_outputs().len(), 2);

        let delta = PlatformId::Delta.spec();
        let ports = delta.analog_outputs();
        assert_eq!(ports.len(), 8);
        assert_eq!(ports[7].port_id, "OUT8");
        assert!(ports[7].characteristics.is_none());
    }

    #[test]
    fn lookup_by_id_in_either_spelling() {
        let go = PlatformId::Go.spec();
        assert_eq!(go.analog_input_by_id("IN2").unwrap().port_id, "Input2");
        assert_eq!(go.analog_input_by_id("Input1").unwrap().port_id, "Input1");
        assert_eq!(
            go.analog_output_by_id("OUT1").unwrap().direction,
            PortDirection::Output
        );
        assert!(go.analog_input_by_id("IN3").is_none());
        assert!(go.analog_input_by_id("OUT1").is_none());
        assert!(go.analog_input_by_id("IN01").is_none());
        assert!(go.analog_output_by_id("Output0").is_none());
    }

    #[test]
    fn dio_header_follows_pin_count() {
        let header = PlatformId::Go.spec().dio_header().unwrap();
        assert_eq!(header.num_pins, 16);
        let dio = header.characteristics.unwrap();
        assert_eq!(dio.logic_level, "3.3V");
        assert_eq!(dio.connector, Connector::RibbonCable);

        assert!(PlatformId::Pro.spec().dio_header().is_none());
        assert_eq!(PlatformId::Delta.spec().dio_header().unwrap().num_pins, 32);
    }

    #[test]
    fn port_record_serializes_kebab_case() {
        let port = PlatformId::Go.spec().analog_input_by_id("IN1").unwrap();
        let json = serde_json::to_value(&port).unwrap();
        assert_eq!(json["port-id"], "Input1");
        assert_eq!(json["connector"], "BNC");
        assert_eq!(json["direction"], "input");
        assert_eq!(json["characteristics"]["sample-rate-msa"], 125);
    }
}
