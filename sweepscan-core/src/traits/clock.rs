//! Monotonic time sources
//!
//! Both clocks count up from boot and wrap at `u32::MAX`. Consumers must
//! compare timestamps with `wrapping_sub`, never with `<`.

/// Millisecond clock (wraps after ~49.7 days)
pub trait MillisClock {
    /// Milliseconds since boot, wrapping
    fn now_ms(&self) -> u32;
}

/// Microsecond clock (wraps after ~71.6 minutes)
pub trait MicrosClock {
    /// Microseconds since boot, wrapping
    fn now_us(&self) -> u32;
}
