//! Board-agnostic core logic for the sweep scanner firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware capability traits (stepper, range sensor, clocks, line output)
//! - Sweep controller (direction reversal at each full revolution)
//! - Sampler (period gate, angle conversion, fault classification)
//! - Scanner control loop composing the two
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod sampling;
pub mod scanner;
pub mod sweep;
pub mod traits;

pub use scanner::{ScanError, Scanner, Tick};
