//! Stepper driver implementations

pub mod four_wire;
// pub mod step_dir;  // Future: A4988/TMC2209 step/dir drivers

pub use four_wire::{FourWireStepper, FULL_STEP_SEQUENCE};
