//! Configuration
//!
//! The scanner has no runtime configuration surface. Values are fixed at
//! build time; see the firmware's `scanner.toml`.

pub mod types;

pub use types::ScanConfig;
