//! Distance sensor capability

/// Distance the sensor reports when no reflective target was detected
pub const MAX_RANGE_SENTINEL_MM: u16 = 8191;

/// Range status codes reported alongside each measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeStatus {
    /// Measurement is valid
    Valid,
    /// Sigma (standard deviation) check failed
    SigmaFail,
    /// Return signal too weak
    SignalFail,
    /// Target closer than the minimum range
    MinRangeFail,
    /// Phase check failed: target outside the valid range
    OutOfRange,
    /// Sensor hardware fault
    HardwareFail,
    /// Code outside the documented set
    Unknown(u8),
}

impl RangeStatus {
    /// Status code value for [`RangeStatus::OutOfRange`]
    pub const OUT_OF_RANGE_CODE: u8 = 4;

    /// Decode a numeric status code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RangeStatus::Valid,
            1 => RangeStatus::SigmaFail,
            2 => RangeStatus::SignalFail,
            3 => RangeStatus::MinRangeFail,
            Self::OUT_OF_RANGE_CODE => RangeStatus::OutOfRange,
            5 => RangeStatus::HardwareFail,
            other => RangeStatus::Unknown(other),
        }
    }

    /// Numeric status code
    pub fn code(self) -> u8 {
        match self {
            RangeStatus::Valid => 0,
            RangeStatus::SigmaFail => 1,
            RangeStatus::SignalFail => 2,
            RangeStatus::MinRangeFail => 3,
            RangeStatus::OutOfRange => Self::OUT_OF_RANGE_CODE,
            RangeStatus::HardwareFail => 5,
            RangeStatus::Unknown(code) => code,
        }
    }
}

/// One range measurement as reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeMeasurement {
    /// Sensor-reported status for this measurement
    pub range_status: RangeStatus,
    /// Measured distance in millimeters
    pub range_mm: u16,
}

impl RangeMeasurement {
    /// Create a measurement from a raw status code and distance
    pub fn new(status_code: u8, range_mm: u16) -> Self {
        Self {
            range_status: RangeStatus::from_code(status_code),
            range_mm,
        }
    }
}

/// Trait for time-of-flight range sensors
pub trait RangeSensor {
    /// Error type for bus or device failures
    type Error;

    /// Boot and configure the sensor
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Switch the sensor into continuous ranging
    fn start_range_continuous(&mut self) -> Result<(), Self::Error>;

    /// Take one measurement
    ///
    /// Blocks the caller until the sensor has a result.
    fn ranging_test(&mut self) -> Result<RangeMeasurement, Self::Error>;
}
