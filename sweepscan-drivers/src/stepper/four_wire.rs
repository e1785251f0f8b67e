//! Unipolar 4-wire stepper driver (ULN2003 + 28BYJ-48)
//!
//! Energizes four coil outputs directly from GPIO using the two-phase
//! full-step sequence, and schedules steps in software against a
//! microsecond clock.
//!
//! # Speed Profile
//!
//! Trapezoidal: constant acceleration up to the maximum speed, cruise, then
//! constant deceleration so the motor stops on the target. Step intervals
//! follow the recursive approximation from D. Austin, "Generate stepper-motor
//! speed profiles in real time" (2005):
//!
//! ```text
//! c0 = 0.676 * sqrt(2 / accel) * 1e6     (first interval, us)
//! cn = cn-1 - 2 * cn-1 / (4n + 1)        (subsequent intervals)
//! ```
//!
//! A negative `n` means the motor is decelerating.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};
use micromath::F32Ext;

use sweepscan_core::traits::{Direction, MicrosClock, SteppingMotor};

/// Coil patterns for one electrical cycle; bit `i` drives coil IN(i+1)
///
/// IN1+IN2, IN2+IN3, IN3+IN4, IN4+IN1
pub const FULL_STEP_SEQUENCE: [u8; 4] = [0b0011, 0b0110, 0b1100, 0b1001];

const MICROS_PER_SECOND: f32 = 1_000_000.0;

/// Equation 15 correction factor for the first step interval
const FIRST_STEP_FACTOR: f32 = 0.676;

/// 4-wire unipolar stepper with acceleration
///
/// `coils` are IN1..IN4 of the driver board in order.
pub struct FourWireStepper<P, C> {
    coils: [P; 4],
    clock: C,
    current_position: i32,
    target_position: i32,
    /// Signed speed in steps/second (negative = counter-clockwise)
    speed: f32,
    max_speed: f32,
    acceleration: f32,
    step_interval_us: u32,
    last_step_us: u32,
    /// Ramp step counter
    n: i32,
    /// Initial step interval in us
    c0: f32,
    /// Current step interval in us
    cn: f32,
    /// Minimum step interval (at max speed) in us
    cmin: f32,
    direction: Direction,
}

impl<P, C> FourWireStepper<P, C>
where
    P: OutputPin<Error = Infallible>,
    C: MicrosClock,
{
    /// Create a driver at position 0 with outputs de-energized
    ///
    /// Defaults to 1 step/s max speed and 1 step/s² acceleration; set real
    /// limits before moving.
    pub fn new(coils: [P; 4], clock: C) -> Self {
        let mut stepper = Self {
            coils,
            clock,
            current_position: 0,
            target_position: 0,
            speed: 0.0,
            max_speed: 1.0,
            acceleration: 1.0,
            step_interval_us: 0,
            last_step_us: 0,
            n: 0,
            c0: first_step_interval(1.0),
            cn: 0.0,
            cmin: MICROS_PER_SECOND,
            direction: Direction::CounterClockwise,
        };
        stepper.disable_outputs();
        stepper
    }

    /// Most recently computed signed speed in steps/second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Maximum speed in steps/second
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Acceleration in steps/second²
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Absolute target position
    pub fn target_position(&self) -> i32 {
        self.target_position
    }

    /// Check if the motor is moving or has steps to go
    pub fn is_running(&self) -> bool {
        self.speed != 0.0 || self.target_position != self.current_position
    }

    /// Redefine the current position without moving
    ///
    /// Also sets the target to the same value and stops the ramp.
    pub fn set_current_position(&mut self, position: i32) {
        self.current_position = position;
        self.target_position = position;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    /// Move relative to the current position
    pub fn move_by(&mut self, relative: i32) {
        self.move_to(self.current_position.wrapping_add(relative));
    }

    /// Decelerate to a stop as quickly as the acceleration allows
    pub fn stop(&mut self) {
        if self.speed == 0.0 {
            return;
        }
        let steps_to_stop = self.steps_to_stop() + 1;
        if self.speed > 0.0 {
            self.move_by(steps_to_stop);
        } else {
            self.move_by(-steps_to_stop);
        }
    }

    /// De-energize all coils (motor free-wheels)
    pub fn disable_outputs(&mut self) {
        self.set_coils(0);
    }

    /// Re-energize the coils for the current position
    pub fn enable_outputs(&mut self) {
        self.energize(self.current_position);
    }

    /// Step if one is due at the current speed
    fn run_speed(&mut self) -> bool {
        if self.step_interval_us == 0 {
            return false;
        }

        let now = self.clock.now_us();
        if now.wrapping_sub(self.last_step_us) < self.step_interval_us {
            return false;
        }

        self.current_position = self.current_position.wrapping_add(self.direction.signum());
        self.energize(self.current_position);
        self.last_step_us = now;
        true
    }

    fn steps_to_stop(&self) -> i32 {
        ((self.speed * self.speed) / (2.0 * self.acceleration)) as i32
    }

    /// Recompute speed and step interval after a step or a parameter change
    fn compute_new_speed(&mut self) {
        let distance_to = self.distance_to_go();
        let steps_to_stop = self.steps_to_stop();

        if distance_to == 0 && steps_to_stop <= 1 {
            // At the target and slow enough to stop dead
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        if distance_to > 0 {
            if self.n > 0 {
                // Accelerating: start decelerating if we would overshoot or
                // are heading the wrong way
                if steps_to_stop >= distance_to || self.direction == Direction::CounterClockwise
                {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0
                && steps_to_stop < distance_to
                && self.direction == Direction::Clockwise
            {
                self.n = -self.n;
            }
        } else if distance_to < 0 {
            if self.n > 0 {
                if steps_to_stop >= -distance_to || self.direction == Direction::Clockwise {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0
                && steps_to_stop < -distance_to
                && self.direction == Direction::CounterClockwise
            {
                self.n = -self.n;
            }
        }

        if self.n == 0 {
            // First step from standstill
            self.cn = self.c0;
            self.direction = if distance_to > 0 {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
        } else {
            self.cn -= (2.0 * self.cn) / ((4 * self.n) as f32 + 1.0);
            self.cn = self.cn.max(self.cmin);
        }
        self.n += 1;
        self.step_interval_us = self.cn as u32;
        self.speed = MICROS_PER_SECOND / self.cn;
        if self.direction == Direction::CounterClockwise {
            self.speed = -self.speed;
        }
    }

    fn energize(&mut self, position: i32) {
        self.set_coils(FULL_STEP_SEQUENCE[(position & 0x3) as usize]);
    }

    fn set_coils(&mut self, pattern: u8) {
        for (i, coil) in self.coils.iter_mut().enumerate() {
            let state = PinState::from(pattern & (1 << i) != 0);
            coil.set_state(state).unwrap_or_else(|e| match e {});
        }
    }
}

impl<P, C> SteppingMotor for FourWireStepper<P, C>
where
    P: OutputPin<Error = Infallible>,
    C: MicrosClock,
{
    fn set_max_speed(&mut self, steps_per_second: f32) {
        let speed = steps_per_second.abs();
        if speed == 0.0 || self.max_speed == speed {
            return;
        }
        self.max_speed = speed;
        self.cmin = MICROS_PER_SECOND / speed;
        // Already accelerating: recompute where on the ramp we are
        if self.n > 0 {
            self.n = self.steps_to_stop();
            self.compute_new_speed();
        }
    }

    fn set_acceleration(&mut self, steps_per_second_sq: f32) {
        let acceleration = steps_per_second_sq.abs();
        if acceleration == 0.0 || self.acceleration == acceleration {
            return;
        }
        // Equation 17: keep the current speed on the new ramp
        self.n = (self.n as f32 * (self.acceleration / acceleration)) as i32;
        self.c0 = first_step_interval(acceleration);
        self.acceleration = acceleration;
        self.compute_new_speed();
    }

    fn move_to(&mut self, target_steps: i32) {
        if self.target_position != target_steps {
            self.target_position = target_steps;
            self.compute_new_speed();
        }
    }

    fn run(&mut self) -> bool {
        if self.run_speed() {
            self.compute_new_speed();
        }
        self.is_running()
    }

    fn distance_to_go(&self) -> i32 {
        self.target_position.wrapping_sub(self.current_position)
    }

    fn current_position(&self) -> i32 {
        self.current_position
    }
}

/// First step interval in us for an acceleration in steps/s²
fn first_step_interval(acceleration: f32) -> f32 {
    FIRST_STEP_FACTOR * F32Ext::sqrt(2.0 / acceleration) * MICROS_PER_SECOND
}
