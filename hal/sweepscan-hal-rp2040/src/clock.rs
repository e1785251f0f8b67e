//! Monotonic clocks backed by the embassy time driver

use embassy_time::Instant;
use sweepscan_core::traits::{MicrosClock, MillisClock};

/// Clock reading the embassy timer since boot
///
/// Values are truncated to 32 bits and wrap; consumers compare them with
/// wrapping subtraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MillisClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

impl MicrosClock for EmbassyClock {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}
