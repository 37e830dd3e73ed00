//! A discovered device.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default HTTP port of the device API.
pub const DEFAULT_PORT: u16 = 80;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Metadata for a device seen on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MokuDeviceInfo {
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// User-assigned device name, e.g. `Lilo`.
    #[serde(default)]
    pub canonical_name: Option<String>,
    /// Hardware serial, e.g. `MG106B`.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Service name as announced over zeroconf.
    #[serde(default)]
    pub zeroconf_name: Option<String>,
    /// ISO 8601 timestamp of the last sighting.
    pub last_seen: String,
}

impl MokuDeviceInfo {
    pub fn new(ip: impl Into<String>, last_seen: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port: DEFAULT_PORT,
            canonical_name: None,
            serial_number: None,
            zeroconf_name: None,
            last_seen: last_seen.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_name = Some(name.into());
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Whether `identifier` names this device.
    ///
    /// IP addresses match exactly; names and serial numbers ignore case.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        if identifier == self.ip {
            return true;
        }
        let wanted = identifier.to_lowercase();
        [&self.canonical_name, &self.serial_number]
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase() == wanted)
    }
}

impl fmt::Display for MokuDeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)?;
        if let Some(name) = &self.canonical_name {
            write!(f, " {name}")?;
        }
        if let Some(serial) = &self.serial_number {
            write!(f, " ({serial})")?;
        }
        write!(f, " last seen {}", self.last_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lilo() -> MokuDeviceInfo {
        MokuDeviceInfo::new("192.168.1.100", "2025-10-24T23:30:00")
            .with_name("Lilo")
            .with_serial("MG106B")
    }

    #[test]
    fn matches_by_ip_name_or_serial() {
        let device = lilo();
        assert!(device.matches_identifier("192.168.1.100"));
        assert!(device.matches_identifier("lilo"));
        assert!(device.matches_identifier("LILO"));
        assert!(device.matches_identifier("mg106b"));
        assert!(!device.matches_identifier("192.168.1.10"));
        assert!(!device.matches_identifier("Stitch"));
    }

    #[test]
    fn name_match_folds_unicode_case() {
        let device = MokuDeviceInfo::new("10.0.0.7", "2025-10-24T23:30:00").with_name("Łódź");
        assert!(device.matches_identifier("łÓDŹ"));
        assert!(!device.matches_identifier("lodz"));
    }

    #[test]
    fn anonymous_device_matches_only_ip() {
        let device = MokuDeviceInfo::new("10.0.0.5", "2025-01-01T00:00:00");
        assert!(device.matches_identifier("10.0.0.5"));
        assert!(!device.matches_identifier(""));
    }

    #[test]
    fn port_defaults_when_absent() {
        let device: MokuDeviceInfo = serde_json::from_str(
            r#"{"ip": "10.0.0.5", "last_seen": "2025-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(device.port, 80);
        assert!(device.canonical_name.is_none());
    }

    #[test]
    fn display() {
        assert_eq!(
            lilo().with_port(8080).to_string(),
            "192.168.1.100:8080 Lilo (MG106B) last seen 2025-10-24T23:30:00"
        );
    }
}
