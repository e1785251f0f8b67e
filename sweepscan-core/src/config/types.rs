//! Configuration type definitions

/// Steps per output-shaft revolution of a 28BYJ-48 in full-step mode
pub const DEFAULT_STEPS_PER_REVOLUTION: u16 = 2048;

/// Sampling period in milliseconds
pub const DEFAULT_SAMPLE_PERIOD_MS: u32 = 200;

/// Serial rate the host visualizers open the port at
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Scanner configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanConfig {
    /// Motor steps in one full revolution of the platform
    pub steps_per_revolution: u16,
    /// Maximum motor speed in steps/second
    pub max_speed: f32,
    /// Motor acceleration in steps/second²
    pub acceleration: f32,
    /// Minimum time between samples in milliseconds
    pub sample_period_ms: u32,
    /// Serial output baud rate
    pub baudrate: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ScanConfig {
    /// Defaults for the reference hardware
    pub const DEFAULT: Self = Self {
        steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
        max_speed: 1000.0,
        acceleration: 500.0,
        sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,
        baudrate: DEFAULT_BAUDRATE,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.steps_per_revolution, 2048);
        assert_eq!(config.max_speed, 1000.0);
        assert_eq!(config.acceleration, 500.0);
        assert_eq!(config.sample_period_ms, 200);
        assert_eq!(config.baudrate, 9600);
    }

    #[test]
    fn test_struct_update_keeps_defaults() {
        let config = ScanConfig {
            steps_per_revolution: 4096,
            ..Default::default()
        };
        assert_eq!(config.steps_per_revolution, 4096);
        assert_eq!(config.baudrate, DEFAULT_BAUDRATE);
        assert_eq!(config.sample_period_ms, DEFAULT_SAMPLE_PERIOD_MS);
    }
}
