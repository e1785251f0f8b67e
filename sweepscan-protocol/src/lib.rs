//! Sweepscan serial output protocol
//!
//! The scanner reports one text line per sample over UART. This crate owns
//! the line format on both ends: the firmware encodes samples with it, and
//! host tooling parses lines back and accumulates them into a polar map.
//!
//! # Line Format
//!
//! ```text
//! Angle: 180.0°, Distance: 150 mm     (valid sample)
//! Angle: 180.0°, Sensor ERROR!        (faulted sample)
//! ```
//!
//! Angles carry one decimal place and lie in [0, 360). Distances are whole
//! millimeters.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod line;
pub mod scan_map;

pub use line::{
    encode_reading, parse_line, LineBuffer, LineError, LineReading, BOOT_BANNER, BOOT_FAILED,
    BOOT_OK, MAX_LINE_LEN,
};
pub use scan_map::{ProximityBand, ScanMap, MAX_PLAUSIBLE_MM};
