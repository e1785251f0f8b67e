//! Hardware capability traits
//!
//! These traits define the interface between the scan logic and
//! hardware-specific implementations.

pub mod clock;
pub mod output;
pub mod ranging;
pub mod stepper;

pub use clock::{MicrosClock, MillisClock};
pub use output::LineSink;
pub use ranging::{RangeMeasurement, RangeSensor, RangeStatus, MAX_RANGE_SENTINEL_MM};
pub use stepper::{Direction, SteppingMotor};
