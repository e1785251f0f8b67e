//! Range sensor implementations

pub mod vl53l0x;

pub use vl53l0x::{RangingError, Vl53l0x, DEFAULT_ADDRESS};
