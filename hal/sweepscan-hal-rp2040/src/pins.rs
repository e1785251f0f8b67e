//! Stepper coil GPIO setup

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;

/// Configure four pins as coil outputs, all de-energized
///
/// Pins are given in driver input order IN1 to IN4.
pub fn coil_outputs(
    in1: Peri<'static, impl Pin>,
    in2: Peri<'static, impl Pin>,
    in3: Peri<'static, impl Pin>,
    in4: Peri<'static, impl Pin>,
) -> [Output<'static>; 4] {
    [
        Output::new(in1, Level::Low),
        Output::new(in2, Level::Low),
        Output::new(in3, Level::Low),
        Output::new(in4, Level::Low),
    ]
}
