//! Stepper motor capability
//!
//! This trait abstracts over step-generation implementations that advance
//! a motor toward an absolute target one step at a time without blocking.

/// Sweep rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise rotation (increasing step count)
    Clockwise,
    /// Counter-clockwise rotation (decreasing step count)
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Sign applied to step deltas travelling in this direction
    pub fn signum(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Trait for position-controlled stepper motors
///
/// Positions are absolute signed step counts since power-up. The motor is
/// assumed infallible once constructed.
pub trait SteppingMotor {
    /// Set the maximum permitted speed in steps/second
    fn set_max_speed(&mut self, steps_per_second: f32);

    /// Set the acceleration/deceleration rate in steps/second²
    fn set_acceleration(&mut self, steps_per_second_sq: f32);

    /// Set an absolute target position
    fn move_to(&mut self, target_steps: i32);

    /// Advance toward the target
    ///
    /// Non-blocking: takes at most one step, and only when one is due.
    /// Returns true while the motor is still moving or has steps to go.
    fn run(&mut self) -> bool;

    /// Steps remaining to the target (signed)
    fn distance_to_go(&self) -> i32;

    /// Current absolute position in steps
    fn current_position(&self) -> i32;
}
