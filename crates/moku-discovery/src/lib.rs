//! Device records for Moku hardware found on the network, and the local
//! cache used to resolve a device name or serial number to an address.
//!
//! Network discovery itself happens elsewhere; this crate only models and
//! persists its results.

pub mod cache;
pub mod device;
pub mod error;

pub use cache::DeviceCache;
pub use device::MokuDeviceInfo;
pub use error::{DiscoveryError, Result};
