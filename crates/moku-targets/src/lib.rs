//! Platform topology definitions for the Moku family of devices.
//!
//! A platform declares how many instrument slots it has, how many physical
//! analog channels it exposes, and which virtual ports each instrument kind
//! exposes when loaded into one of its slots.
//!
//! - **Catalog:** the four predefined platforms (Go, Lab, Pro, Delta)
//! - **Instruments:** the closed set of instrument kinds and their port exposure
//! - **Platform files:** custom platforms loaded from `.platform.toml` files

pub mod error;
pub mod hardware;
pub mod instrument;
pub mod parse;
pub mod platform;

pub use error::{Result, TargetError};
pub use hardware::{
    AnalogCharacteristics, AnalogFrontEnd, AnalogPort, Connector, DioCharacteristics, DioHeader,
    PortDirection,
};
pub use instrument::{InstrumentKind, InstrumentPorts};
pub use platform::{PhysicalNaming, PlatformId, PlatformSpec};
