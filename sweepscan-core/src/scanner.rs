//! Scanner control loop
//!
//! Composes the sweep controller and the sampler around one motor, one
//! range sensor and one output sink. The firmware calls [`Scanner::start`]
//! once and then [`Scanner::tick`] as often as it can.

use sweepscan_protocol::{LineError, BOOT_BANNER, BOOT_FAILED, BOOT_OK};

use crate::config::ScanConfig;
use crate::sampling::{Sample, Sampler};
use crate::sweep::SweepController;
use crate::traits::{Direction, LineSink, RangeSensor, SteppingMotor};

/// Errors surfaced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError<S, K> {
    /// Range sensor failed to boot; fatal
    SensorInit(S),
    /// Output sink rejected a line
    Output(K),
    /// Sample line did not fit the line buffer
    Encode(LineError),
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// New sweep direction if the motor reached its target
    pub reversed: Option<Direction>,
    /// Sample taken and emitted this tick
    pub sample: Option<Sample>,
}

/// Rotating rangefinder control loop
pub struct Scanner<M, S, K> {
    motor: M,
    sensor: S,
    sink: K,
    sweep: SweepController,
    sampler: Sampler,
}

impl<M, S, K> Scanner<M, S, K>
where
    M: SteppingMotor,
    S: RangeSensor,
    K: LineSink,
{
    /// Create a scanner and apply the motion limits to the motor
    pub fn new(mut motor: M, sensor: S, sink: K, config: &ScanConfig) -> Self {
        motor.set_max_speed(config.max_speed);
        motor.set_acceleration(config.acceleration);

        Self {
            motor,
            sensor,
            sink,
            sweep: SweepController::new(config.steps_per_revolution),
            sampler: Sampler::new(config.steps_per_revolution, config.sample_period_ms),
        }
    }

    /// Boot the sensor, print the two startup lines, and start the sweep
    ///
    /// On `Err(ScanError::SensorInit)` the failure line has already been
    /// written; the caller is expected to halt.
    pub fn start(&mut self) -> Result<(), ScanError<S::Error, K::Error>> {
        self.sink
            .write_line(BOOT_BANNER)
            .map_err(ScanError::Output)?;

        let booted = self
            .sensor
            .begin()
            .and_then(|()| self.sensor.start_range_continuous());

        if let Err(e) = booted {
            self.sink
                .write_line(BOOT_FAILED)
                .map_err(ScanError::Output)?;
            return Err(ScanError::SensorInit(e));
        }

        self.sink.write_line(BOOT_OK).map_err(ScanError::Output)?;
        self.sweep.begin(&mut self.motor);
        Ok(())
    }

    /// Run one control-loop iteration at time `now_ms`
    ///
    /// Advances the motor, reverses at the target, and if the sample period
    /// has elapsed, measures and writes one line.
    pub fn tick(&mut self, now_ms: u32) -> Result<Tick, ScanError<S::Error, K::Error>> {
        let reversed = self.sweep.advance(&mut self.motor);

        let position = self.motor.current_position();
        let sample = self.sampler.sample(now_ms, &mut self.sensor, position);

        if let Some(sample) = &sample {
            let line = sample.to_line().map_err(ScanError::Encode)?;
            self.sink.write_line(&line).map_err(ScanError::Output)?;
        }

        Ok(Tick { reversed, sample })
    }

    /// Sweep controller state
    pub fn sweep(&self) -> &SweepController {
        &self.sweep
    }

    /// Sampler state
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Motor reference
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Output sink reference
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Release the owned hardware
    pub fn into_parts(self) -> (M, S, K) {
        (self.motor, self.sensor, self.sink)
    }
}
