//! CLI command implementations.

pub mod device;
pub mod export;
pub mod platform;
pub mod validate;
