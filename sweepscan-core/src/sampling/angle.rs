//! Step position to angle conversion

/// Convert an absolute step position to an angle in [0, 360)
///
/// The position is reduced modulo one revolution; negative positions wrap
/// around, so -512 steps on a 2048-step motor is 270°.
pub fn normalize_angle(position_steps: i32, steps_per_revolution: u16) -> f32 {
    let revolution = i32::from(steps_per_revolution.max(1));
    let degrees_per_step = 360.0 / revolution as f32;

    let mut angle = (position_steps % revolution) as f32 * degrees_per_step;
    if angle < 0.0 {
        angle += 360.0;
    }
    // f32 rounding on very fine step sizes
    if angle >= 360.0 {
        angle -= 360.0;
    }
    angle
}
