//! Scan loop task
//!
//! Drives the scanner as fast as the executor allows. Every iteration steps
//! the motor if a step is due and takes a sample once the period has
//! elapsed; the measurement itself blocks until the sensor has a result.

use defmt::*;
use embassy_futures::yield_now;

use sweepscan_core::traits::MillisClock;
use sweepscan_core::Scanner;
use sweepscan_hal_rp2040::{EmbassyClock, RpRangeSensor, RpStepper, UartLineSink};

/// Scanner wired to the board hardware
pub type FirmwareScanner = Scanner<RpStepper, RpRangeSensor, UartLineSink>;

#[embassy_executor::task]
pub async fn scan_task(mut scanner: FirmwareScanner) {
    info!("Scan task started");

    let clock = EmbassyClock;

    loop {
        match scanner.tick(clock.now_ms()) {
            Ok(tick) => {
                if let Some(direction) = tick.reversed {
                    debug!(
                        "Sweep reversed: {} (reversal #{})",
                        direction,
                        scanner.sweep().reversals()
                    );
                }

                if let Some(sample) = tick.sample {
                    if sample.is_valid() {
                        trace!("Sample: {}", sample);
                    } else {
                        warn!(
                            "Sensor fault at {} deg ({} total)",
                            sample.angle_deg,
                            scanner.sampler().fault_count()
                        );
                    }
                }
            }
            Err(e) => error!("Scan tick failed: {}", e),
        }

        yield_now().await;
    }
}
