//! Sweep control
//!
//! Drives the platform back and forth across one full revolution.

pub mod controller;

pub use controller::{SweepController, SweepState};
