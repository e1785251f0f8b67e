//! RP2040-specific HAL glue for the scanner firmware
//!
//! Binds the board-agnostic traits from `sweepscan-core` to embassy-rp
//! peripherals:
//!
//! - Embassy monotonic time as millisecond and microsecond clocks
//! - Blocking UART transmitter as the line sink
//! - GPIO outputs for the four stepper coils

#![no_std]

pub mod clock;
pub mod pins;
pub mod uart;

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use sweepscan_drivers::ranging::Vl53l0x;
use sweepscan_drivers::stepper::FourWireStepper;

pub use clock::EmbassyClock;
pub use pins::coil_outputs;
pub use uart::UartLineSink;

/// Coil stepper driven from GPIO and the embassy clock
pub type RpStepper = FourWireStepper<Output<'static>, EmbassyClock>;

/// Range sensor on the I2C0 bus
pub type RpRangeSensor = Vl53l0x<I2c<'static, I2C0, Blocking>>;
