//! Sample line encoding and parsing.

use core::fmt::Write;

use heapless::String;

/// Maximum encoded line length in bytes (without line terminator)
pub const MAX_LINE_LEN: usize = 48;

/// First startup diagnostic line, printed before the sensor is booted
pub const BOOT_BANNER: &str = "VL53L0X range sensor init";

/// Second startup diagnostic line on success
pub const BOOT_OK: &str = "VL53L0X ready";

/// Second startup diagnostic line on failure; nothing follows it
pub const BOOT_FAILED: &str = "Failed to boot VL53L0X";

const ANGLE_PREFIX: &str = "Angle:";
const DISTANCE_PREFIX: &str = "Distance:";
const DISTANCE_UNIT: &str = "mm";
const ERROR_MARKER: &str = "Sensor ERROR!";
const DEGREE_SIGN: char = '°';

/// Smallest angle that prints as 360.0 at one decimal place
const ROUNDS_TO_FULL_TURN: f32 = 359.95;

/// Encoded line storage
pub type LineBuffer = String<MAX_LINE_LEN>;

/// Errors from line encoding or parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line does not have the `Angle: ..., ...` shape
    Malformed,
    /// Angle field is not a finite number
    InvalidAngle,
    /// Distance field is not a whole number of millimeters
    InvalidDistance,
    /// Encoded line does not fit in [`MAX_LINE_LEN`]
    BufferFull,
}

/// One decoded sample line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineReading {
    /// Angle in degrees
    pub angle_deg: f32,
    /// Distance in millimeters, `None` for a faulted sample
    pub distance_mm: Option<u16>,
}

impl LineReading {
    /// Check if the line reported a sensor fault
    pub fn is_fault(&self) -> bool {
        self.distance_mm.is_none()
    }
}

/// Encode a sample as an output line
///
/// `Some(distance)` produces the distance form, `None` the error form.
/// Angles that would round to 360.0 are printed as 0.0.
pub fn encode_reading(angle_deg: f32, distance_mm: Option<u16>) -> Result<LineBuffer, LineError> {
    let angle_deg = if angle_deg >= ROUNDS_TO_FULL_TURN {
        0.0
    } else {
        angle_deg
    };
    let mut line = LineBuffer::new();
    let written = match distance_mm {
        Some(mm) => write!(
            line,
            "{} {:.1}{}, {} {} {}",
            ANGLE_PREFIX, angle_deg, DEGREE_SIGN, DISTANCE_PREFIX, mm, DISTANCE_UNIT
        ),
        None => write!(
            line,
            "{} {:.1}{}, {}",
            ANGLE_PREFIX, angle_deg, DEGREE_SIGN, ERROR_MARKER
        ),
    };
    written.map_err(|_| LineError::BufferFull)?;
    Ok(line)
}

/// Parse one output line
///
/// Surrounding whitespace and a trailing `\r` are ignored, and the degree
/// sign is optional so lines survive lossy serial decoding.
pub fn parse_line(line: &str) -> Result<LineReading, LineError> {
    let (angle_field, rest) = line.trim().split_once(',').ok_or(LineError::Malformed)?;

    let angle_str = angle_field
        .trim()
        .strip_prefix(ANGLE_PREFIX)
        .ok_or(LineError::Malformed)?
        .trim()
        .trim_end_matches(DEGREE_SIGN)
        .trim_end();
    let angle_deg: f32 = angle_str.parse().map_err(|_| LineError::InvalidAngle)?;
    if !angle_deg.is_finite() {
        return Err(LineError::InvalidAngle);
    }

    let rest = rest.trim();
    if rest == ERROR_MARKER {
        return Ok(LineReading {
            angle_deg,
            distance_mm: None,
        });
    }

    let distance_str = rest
        .strip_prefix(DISTANCE_PREFIX)
        .ok_or(LineError::Malformed)?
        .trim()
        .strip_suffix(DISTANCE_UNIT)
        .ok_or(LineError::Malformed)?
        .trim_end();
    let distance_mm: u16 = distance_str
        .parse()
        .map_err(|_| LineError::InvalidDistance)?;

    Ok(LineReading {
        angle_deg,
        distance_mm: Some(distance_mm),
    })
}
