//! Sweep controller
//!
//! Two states, SweepingClockwise and SweepingCounterClockwise, represented by
//! the current [`Direction`]. The only transition is "target reached", which
//! flips the direction and sets a new target one revolution away from the
//! current position. Neither state is terminal.

use crate::traits::{Direction, SteppingMotor};

/// Snapshot of the sweep state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepState {
    /// Absolute target position in steps
    pub target_steps: i32,
    /// Current sweep direction
    pub direction: Direction,
}

/// Alternating-direction sweep controller
#[derive(Debug, Clone)]
pub struct SweepController {
    steps_per_revolution: i32,
    state: SweepState,
    reversals: u32,
}

impl SweepController {
    /// Create a controller for a motor starting at position 0
    ///
    /// The first sweep runs clockwise to +1 revolution.
    pub fn new(steps_per_revolution: u16) -> Self {
        let steps_per_revolution = i32::from(steps_per_revolution);
        Self {
            steps_per_revolution,
            state: SweepState {
                target_steps: steps_per_revolution,
                direction: Direction::Clockwise,
            },
            reversals: 0,
        }
    }

    /// Issue the initial target to the motor
    pub fn begin<M: SteppingMotor>(&self, motor: &mut M) {
        motor.move_to(self.state.target_steps);
    }

    /// Run one control-loop iteration
    ///
    /// Advances the motor by one `run()` call. If the target is reached,
    /// reverses and returns the new direction.
    pub fn advance<M: SteppingMotor>(&mut self, motor: &mut M) -> Option<Direction> {
        motor.run();

        if motor.distance_to_go() != 0 {
            return None;
        }

        let direction = self.state.direction.opposite();
        let target_steps =
            motor.current_position() + direction.signum() * self.steps_per_revolution;

        self.state = SweepState {
            target_steps,
            direction,
        };
        self.reversals = self.reversals.wrapping_add(1);
        motor.move_to(target_steps);

        Some(direction)
    }

    /// Current sweep state
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Current sweep direction
    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    /// Current absolute target in steps
    pub fn target_steps(&self) -> i32 {
        self.state.target_steps
    }

    /// Number of completed sweeps since startup
    pub fn reversals(&self) -> u32 {
        self.reversals
    }
}
