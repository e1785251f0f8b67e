//! Sampler
//!
//! Each period: measure (blocking), convert the motor position to an angle,
//! classify. The measurement stalls the caller for its duration, motor
//! stepping included.

use crate::sampling::angle::normalize_angle;
use crate::sampling::sample::{classify, Reading, Sample};
use crate::sampling::timer::SampleTimer;
use crate::traits::RangeSensor;

/// Periodic sampler
#[derive(Debug, Clone)]
pub struct Sampler {
    timer: SampleTimer,
    steps_per_revolution: u16,
    /// Faulted samples since startup. Informational only.
    fault_count: u32,
}

impl Sampler {
    /// Create a sampler
    pub fn new(steps_per_revolution: u16, period_ms: u32) -> Self {
        Self {
            timer: SampleTimer::new(period_ms),
            steps_per_revolution,
            fault_count: 0,
        }
    }

    /// Take a sample if the period has elapsed
    ///
    /// A sensor error counts as a faulted sample; there is no retry.
    pub fn sample<S: RangeSensor>(
        &mut self,
        now_ms: u32,
        sensor: &mut S,
        position_steps: i32,
    ) -> Option<Sample> {
        if !self.timer.poll(now_ms) {
            return None;
        }

        let reading = match sensor.ranging_test() {
            Ok(measurement) => classify(&measurement),
            Err(_) => Reading::Faulted,
        };
        if reading == Reading::Faulted {
            self.fault_count = self.fault_count.wrapping_add(1);
        }

        Some(Sample {
            angle_deg: normalize_angle(position_steps, self.steps_per_revolution),
            reading,
        })
    }

    /// Faulted samples since startup
    pub fn fault_count(&self) -> u32 {
        self.fault_count
    }

    /// Sample period gate
    pub fn timer(&self) -> &SampleTimer {
        &self.timer
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::traits::RangeMeasurement;
    use std::collections::VecDeque;

    /// Sensor replaying scripted results
    #[derive(Debug, Default)]
    pub(crate) struct FakeSensor {
        pub results: VecDeque<Result<RangeMeasurement, ()>>,
        pub boot_ok: bool,
        pub continuous: bool,
        pub measurements: u32,
    }

    impl FakeSensor {
        pub fn with_results(results: &[Result<RangeMeasurement, ()>]) -> Self {
            Self {
                results: results.iter().copied().collect(),
                boot_ok: true,
                ..Default::default()
            }
        }
    }

    impl RangeSensor for FakeSensor {
        type Error = ();

        fn begin(&mut self) -> Result<(), ()> {
            if self.boot_ok {
                Ok(())
            } else {
                Err(())
            }
        }

        fn start_range_continuous(&mut self) -> Result<(), ()> {
            self.continuous = true;
            Ok(())
        }

        fn ranging_test(&mut self) -> Result<RangeMeasurement, ()> {
            self.measurements += 1;
            self.results
                .pop_front()
                .unwrap_or(Ok(RangeMeasurement::new(0, 100)))
        }
    }

    #[test]
    fn test_no_measurement_before_period() {
        let mut sampler = Sampler::new(2048, 200);
        let mut sensor = FakeSensor::with_results(&[]);

        assert_eq!(sampler.sample(199, &mut sensor, 0), None);
        assert_eq!(sensor.measurements, 0);
    }

    #[test]
    fn test_valid_sample_at_half_revolution() {
        let mut sampler = Sampler::new(2048, 200);
        let mut sensor = FakeSensor::with_results(&[Ok(RangeMeasurement::new(0, 150))]);

        let sample = sampler.sample(200, &mut sensor, 1024).unwrap();
        assert_eq!(sample.angle_deg, 180.0);
        assert_eq!(sample.reading, Reading::Valid { distance_mm: 150 });
        assert_eq!(sampler.fault_count(), 0);
    }

    #[test]
    fn test_faults_are_counted_and_independent() {
        let mut sampler = Sampler::new(2048, 200);
        let mut sensor = FakeSensor::with_results(&[
            Ok(RangeMeasurement::new(4, 0)),
            Err(()),
            Ok(RangeMeasurement::new(0, 8191)),
            Ok(RangeMeasurement::new(0, 300)),
        ]);

        let readings: [Reading; 4] = core::array::from_fn(|i| {
            sampler
                .sample(200 * (i as u32 + 1), &mut sensor, -512)
                .unwrap()
                .reading
        });

        assert_eq!(
            readings,
            [
                Reading::Faulted,
                Reading::Faulted,
                Reading::Faulted,
                Reading::Valid { distance_mm: 300 },
            ]
        );
        assert_eq!(sampler.fault_count(), 3);
    }

    #[test]
    fn test_negative_position_angle() {
        let mut sampler = Sampler::new(2048, 200);
        let mut sensor = FakeSensor::with_results(&[]);

        let sample = sampler.sample(1000, &mut sensor, -512).unwrap();
        assert_eq!(sample.angle_deg, 270.0);
    }
}
