//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the capability traits
//! defined in sweepscan-core:
//!
//! - Stepper drivers (unipolar 4-wire with acceleration ramp)
//! - Range sensors (VL53L0X time-of-flight)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod ranging;
pub mod stepper;
