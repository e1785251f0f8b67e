//! Sweepscan - Rotating Rangefinder Firmware
//!
//! Main firmware binary for RP2040-based boards. A 28BYJ-48 stepper sweeps
//! a VL53L0X time-of-flight sensor back and forth over a full revolution
//! while samples are streamed over UART as `Angle: …, Distance: …` lines.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::uart::{self, UartTx};
use {defmt_rtt as _, panic_probe as _};

use sweepscan_core::Scanner;
use sweepscan_drivers::ranging::Vl53l0x;
use sweepscan_drivers::stepper::FourWireStepper;
use sweepscan_hal_rp2040::{coil_outputs, EmbassyClock, UartLineSink};

use crate::config::SCAN_CONFIG;

mod config;
mod tasks;

/// I2C bus speed for the range sensor
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Sweepscan firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");
    info!("Scan config: {}", SCAN_CONFIG);

    // Sample stream on UART0 TX (GPIO0)
    let mut uart_config = uart::Config::default();
    uart_config.baudrate = SCAN_CONFIG.baudrate;
    let tx = UartTx::new_blocking(p.UART0, p.PIN_0, uart_config);
    let sink = UartLineSink::new(tx);

    // Range sensor on I2C0 (SCL GPIO5, SDA GPIO4)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let sensor = Vl53l0x::new(i2c);

    // Stepper driver board IN1..IN4
    let coils = coil_outputs(p.PIN_2, p.PIN_3, p.PIN_6, p.PIN_7);
    let motor = FourWireStepper::new(coils, EmbassyClock);

    let mut scanner = Scanner::new(motor, sensor, sink, &SCAN_CONFIG);

    if let Err(e) = scanner.start() {
        error!("Scanner startup failed: {}", e);
        // Nothing can be measured without the sensor; idle until reset
        loop {
            embassy_time::Timer::after_secs(60).await;
        }
    }
    info!("Sensor ready, sweeping");

    spawner.spawn(tasks::scan_task(scanner)).unwrap();
}
