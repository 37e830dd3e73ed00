//! JSON-backed cache of discovered devices, keyed by IP address.
//!
//! The on-disk format is a single object mapping each IP to its device record:
//!
//! ```text
//! {
//!   "192.168.1.100": { "ip": "192.168.1.100", "port": 80, "canonical_name": "Lilo", ... }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::device::MokuDeviceInfo;
use crate::error::{DiscoveryError, Result};

/// Devices seen on the network, keyed by IP address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceCache {
    devices: BTreeMap<String, MokuDeviceInfo>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default cache file (`~/.moku-deploy/device_cache.json`).
    pub fn default_path() -> Result<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| {
                PathBuf::from(home)
                    .join(".moku-deploy")
                    .join("device_cache.json")
            })
            .ok_or(DiscoveryError::NoHome)
    }

    /// Add a device, replacing any earlier record with the same IP.
    pub fn add_device(&mut self, device: MokuDeviceInfo) {
        self.devices.insert(device.ip.clone(), device);
    }

    pub fn get_by_ip(&self, ip: &str) -> Option<&MokuDeviceInfo> {
        self.devices.get(ip)
    }

    /// First device, in IP order, matching an IP, name or serial number.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&MokuDeviceInfo> {
        self.devices
            .values()
            .find(|d| d.matches_identifier(identifier))
    }

    pub fn remove(&mut self, ip: &str) -> Option<MokuDeviceInfo> {
        self.devices.remove(ip)
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &MokuDeviceInfo> {
        self.devices.values()
    }

    /// Load a cache file. A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no device cache, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|e| DiscoveryError::CacheError {
            path: path.to_path_buf(),
            detail: format!("reading cache: {e}"),
        })?;
        let cache: DeviceCache = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), devices = cache.len(), "loaded device cache");
        Ok(cache)
    }

    /// Write the cache, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DiscoveryError::CacheError {
                path: parent.to_path_buf(),
                detail: format!("creating cache dir: {e}"),
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| DiscoveryError::CacheError {
            path: path.to_path_buf(),
            detail: format!("writing cache: {e}"),
        })?;
        tracing::debug!(path = %path.display(), devices = self.len(), "saved device cache");
        Ok(())
    }
}
