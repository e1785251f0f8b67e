//! Samples and fault classification

use sweepscan_protocol::{encode_reading, LineBuffer, LineError};

use crate::traits::{RangeMeasurement, RangeStatus, MAX_RANGE_SENTINEL_MM};

/// Outcome of one measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Usable distance in millimeters
    Valid { distance_mm: u16 },
    /// Out of range, no target, or the sensor could not be read
    Faulted,
}

/// Classify a sensor measurement
///
/// Faulted if the sensor reported the out-of-range status or returned the
/// max-range sentinel distance. Every other status is accepted as is.
pub fn classify(measurement: &RangeMeasurement) -> Reading {
    if measurement.range_status == RangeStatus::OutOfRange
        || measurement.range_mm == MAX_RANGE_SENTINEL_MM
    {
        return Reading::Faulted;
    }
    Reading::Valid {
        distance_mm: measurement.range_mm,
    }
}

/// One emitted sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Platform angle in [0, 360)
    pub angle_deg: f32,
    /// Classified measurement
    pub reading: Reading,
}

impl Sample {
    /// Check if the sample carries a distance
    pub fn is_valid(&self) -> bool {
        matches!(self.reading, Reading::Valid { .. })
    }

    /// Distance in millimeters for valid samples
    pub fn distance_mm(&self) -> Option<u16> {
        match self.reading {
            Reading::Valid { distance_mm } => Some(distance_mm),
            Reading::Faulted => None,
        }
    }

    /// Render the sample as an output line
    pub fn to_line(&self) -> Result<LineBuffer, LineError> {
        encode_reading(self.angle_deg, self.distance_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_out_of_range_status_is_faulted() {
        for distance in [0, 150, 8190, 8191, u16::MAX] {
            assert_eq!(
                classify(&RangeMeasurement::new(4, distance)),
                Reading::Faulted
            );
        }
    }

    #[test]
    fn test_max_range_sentinel_is_faulted() {
        for status in 0..=u8::MAX {
            assert_eq!(
                classify(&RangeMeasurement::new(status, 8191)),
                Reading::Faulted
            );
        }
    }

    #[test]
    fn test_other_statuses_are_valid() {
        assert_eq!(
            classify(&RangeMeasurement::new(0, 150)),
            Reading::Valid { distance_mm: 150 }
        );
        assert_eq!(
            classify(&RangeMeasurement::new(2, 20)),
            Reading::Valid { distance_mm: 20 }
        );
        assert_eq!(
            classify(&RangeMeasurement::new(5, 8190)),
            Reading::Valid { distance_mm: 8190 }
        );
    }

    #[test]
    fn test_valid_sample_line() {
        let sample = Sample {
            angle_deg: 180.0,
            reading: classify(&RangeMeasurement::new(0, 150)),
        };
        assert!(sample.is_valid());
        assert_eq!(sample.distance_mm(), Some(150));
        assert_eq!(
            sample.to_line().unwrap().as_str(),
            "Angle: 180.0°, Distance: 150 mm"
        );
    }

    #[test]
    fn test_faulted_sample_line() {
        let sample = Sample {
            angle_deg: 180.0,
            reading: classify(&RangeMeasurement::new(4, 0)),
        };
        assert!(!sample.is_valid());
        assert_eq!(sample.distance_mm(), None);
        assert_eq!(
            sample.to_line().unwrap().as_str(),
            "Angle: 180.0°, Sensor ERROR!"
        );
    }

    proptest! {
        #[test]
        fn prop_classification(status in any::<u8>(), distance in any::<u16>()) {
            let faulted = status == 4 || distance == 8191;
            let reading = classify(&RangeMeasurement::new(status, distance));
            prop_assert_eq!(reading == Reading::Faulted, faulted);
        }
    }
}
