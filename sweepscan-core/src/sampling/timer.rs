//! Sample period gate

/// Fixed-period gate over a wrapping millisecond clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleTimer {
    last_sample_ms: u32,
    period_ms: u32,
}

impl SampleTimer {
    /// Create a timer whose reference point is time zero
    pub fn new(period_ms: u32) -> Self {
        Self {
            last_sample_ms: 0,
            period_ms,
        }
    }

    /// Milliseconds since the last sample, correct across clock wrap
    pub fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_sample_ms)
    }

    /// Check whether a sample is due, and if so restart the period at `now_ms`
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.elapsed(now_ms) < self.period_ms {
            return false;
        }
        self.last_sample_ms = now_ms;
        true
    }

    /// Timestamp of the last sample
    pub fn last_sample_ms(&self) -> u32 {
        self.last_sample_ms
    }

    /// Sampling period in milliseconds
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }
}
