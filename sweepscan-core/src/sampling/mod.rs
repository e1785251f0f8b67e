//! Periodic range sampling
//!
//! Gates measurements on a fixed period, converts the motor position to an
//! angle, and classifies each measurement as valid or faulted.

pub mod angle;
pub mod sample;
pub mod sampler;
pub mod timer;

pub use angle::normalize_angle;
pub use sample::{classify, Reading, Sample};
pub use sampler::Sampler;
pub use timer::SampleTimer;
