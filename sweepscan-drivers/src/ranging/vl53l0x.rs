//! VL53L0X time-of-flight ranging sensor
//!
//! Blocking I2C driver covering what the scanner needs: boot with reference
//! SPAD setup and the stock tuning table, timing budget and reference
//! calibration, continuous back-to-back ranging, and reading one result per
//! call.
//!
//! # Measurement flow
//!
//! After [`RangeSensor::start_range_continuous`] the sensor ranges on its own.
//! Each [`RangeSensor::ranging_test`] waits for the data-ready interrupt bit,
//! reads the result block, and clears the interrupt so the next result can
//! latch.

use embedded_hal::i2c::I2c;
use sweepscan_core::traits::{RangeMeasurement, RangeSensor};

/// 7-bit I2C address the sensor answers on after power-up
pub const DEFAULT_ADDRESS: u8 = 0x29;

/// Expected content of the model ID register
const MODEL_ID: u8 = 0xEE;

/// Data-ready polls before a wait is abandoned
const DATA_READY_POLLS: u32 = 10_000;

/// Final range signal rate limit, 0.25 MCPS in 9.7 fixed point
const SIGNAL_RATE_LIMIT: u16 = 32;

/// Shortest measurement timing budget the device accepts
const MIN_TIMING_BUDGET_US: u32 = 20_000;

// Fixed per-step overheads of one measurement, in microseconds
const START_OVERHEAD_US: u32 = 1910;
const END_OVERHEAD_US: u32 = 960;
const MSRC_OVERHEAD_US: u32 = 660;
const TCC_OVERHEAD_US: u32 = 590;
const DSS_OVERHEAD_US: u32 = 690;
const PRE_RANGE_OVERHEAD_US: u32 = 660;
const FINAL_RANGE_OVERHEAD_US: u32 = 550;

/// Reference SPADs available in the enable map
const REF_SPAD_COUNT: usize = 48;

/// First usable reference SPAD on aperture parts
const FIRST_APERTURE_SPAD: usize = 12;

mod reg {
    pub const SYSRANGE_START: u8 = 0x00;
    pub const SYSTEM_SEQUENCE_CONFIG: u8 = 0x01;
    pub const SYSTEM_INTERRUPT_CONFIG_GPIO: u8 = 0x0A;
    pub const SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
    pub const RESULT_INTERRUPT_STATUS: u8 = 0x13;
    pub const RESULT_RANGE_STATUS: u8 = 0x14;
    pub const FINAL_RANGE_MIN_COUNT_RATE_RTN_LIMIT: u8 = 0x44;
    pub const MSRC_CONFIG_TIMEOUT_MACROP: u8 = 0x46;
    pub const DYNAMIC_SPAD_NUM_REQUESTED_REF_SPAD: u8 = 0x4E;
    pub const DYNAMIC_SPAD_REF_EN_START_OFFSET: u8 = 0x4F;
    pub const PRE_RANGE_CONFIG_VCSEL_PERIOD: u8 = 0x50;
    pub const PRE_RANGE_CONFIG_TIMEOUT_MACROP_HI: u8 = 0x51;
    pub const MSRC_CONFIG_CONTROL: u8 = 0x60;
    pub const FINAL_RANGE_CONFIG_VCSEL_PERIOD: u8 = 0x70;
    pub const FINAL_RANGE_CONFIG_TIMEOUT_MACROP_HI: u8 = 0x71;
    pub const GPIO_HV_MUX_ACTIVE_HIGH: u8 = 0x84;
    pub const VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV: u8 = 0x89;
    pub const GLOBAL_CONFIG_SPAD_ENABLES_REF_0: u8 = 0xB0;
    pub const GLOBAL_CONFIG_REF_EN_START_SELECT: u8 = 0xB6;
    pub const IDENTIFICATION_MODEL_ID: u8 = 0xC0;
}

/// Default tuning settings loaded during boot
#[rustfmt::skip]
const TUNING: &[(u8, u8)] = &[
    (0xFF, 0x01), (0x00, 0x00), (0xFF, 0x00), (0x09, 0x00), (0x10, 0x00),
    (0x11, 0x00), (0x24, 0x01), (0x25, 0xFF), (0x75, 0x00), (0xFF, 0x01),
    (0x4E, 0x2C), (0x48, 0x00), (0x30, 0x20), (0xFF, 0x00), (0x30, 0x09),
    (0x54, 0x00), (0x31, 0x04), (0x32, 0x03), (0x40, 0x83), (0x46, 0x25),
    (0x60, 0x00), (0x27, 0x00), (0x50, 0x06), (0x51, 0x00), (0x52, 0x96),
    (0x56, 0x08), (0x57, 0x30), (0x61, 0x00), (0x62, 0x00), (0x64, 0x00),
    (0x65, 0x00), (0x66, 0xA0), (0xFF, 0x01), (0x22, 0x32), (0x47, 0x14),
    (0x49, 0xFF), (0x4A, 0x00), (0xFF, 0x00), (0x7A, 0x0A), (0x7B, 0x00),
    (0x78, 0x21), (0xFF, 0x01), (0x23, 0x34), (0x42, 0x00), (0x44, 0xFF),
    (0x45, 0x26), (0x46, 0x05), (0x40, 0x40), (0x0E, 0x06), (0x20, 0x1A),
    (0x43, 0x40), (0xFF, 0x00), (0x34, 0x03), (0x35, 0x44), (0xFF, 0x01),
    (0x31, 0x04), (0x4B, 0x09), (0x4C, 0x05), (0x4D, 0x04), (0xFF, 0x00),
    (0x44, 0x00), (0x45, 0x20), (0x47, 0x08), (0x48, 0x28), (0x67, 0x00),
    (0x70, 0x04), (0x71, 0x01), (0x72, 0xFE), (0x76, 0x00), (0x77, 0x00),
    (0xFF, 0x01), (0x0D, 0x01), (0xFF, 0x00), (0x80, 0x01), (0x01, 0xF8),
    (0xFF, 0x01), (0x8E, 0x01), (0x00, 0x01), (0xFF, 0x00), (0x80, 0x00),
];

/// VL53L0X driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangingError<E> {
    /// I2C transfer failed
    Bus(E),
    /// Model ID register did not read 0xEE
    InvalidModelId(u8),
    /// Data-ready bit or NVM read never completed
    Timeout,
    /// Requested timing budget is below the fixed measurement overheads
    TimingBudgetTooShort(u32),
}

impl<E> From<E> for RangingError<E> {
    fn from(e: E) -> Self {
        RangingError::Bus(e)
    }
}

/// Map the device range status field to a measurement status code
///
/// Codes follow [`sweepscan_core::traits::RangeStatus`]: 0 valid,
/// 2 signal, 3 min range, 4 out of range, 5 hardware. Sigma fail (1) comes
/// from the host-side sigma limit check, which is not run here.
fn status_code(device_status: u8) -> u8 {
    match device_status {
        4 => 2,
        8 | 10 => 3,
        6 | 9 => 4,
        1..=3 => 5,
        _ => 0,
    }
}

/// Sequence steps enabled in SYSTEM_SEQUENCE_CONFIG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SequenceSteps {
    tcc: bool,
    dss: bool,
    msrc: bool,
    pre_range: bool,
    final_range: bool,
}

impl SequenceSteps {
    fn from_config(seq: u8) -> Self {
        Self {
            tcc: seq & 0x10 != 0,
            dss: seq & 0x08 != 0,
            msrc: seq & 0x04 != 0,
            pre_range: seq & 0x40 != 0,
            final_range: seq & 0x80 != 0,
        }
    }
}

/// Sequence step timeouts read back from the device
#[derive(Debug, Clone, Copy)]
struct StepTimeouts {
    final_range_vcsel_pclks: u32,
    pre_range_mclks: u32,
    msrc_dss_tcc_us: u32,
    pre_range_us: u32,
    final_range_us: u32,
}

impl StepTimeouts {
    /// Budget consumed by everything except the final range step
    fn fixed_us(&self, steps: &SequenceSteps) -> u32 {
        let mut budget = START_OVERHEAD_US + END_OVERHEAD_US;
        if steps.tcc {
            budget = budget.saturating_add(self.msrc_dss_tcc_us + TCC_OVERHEAD_US);
        }
        if steps.dss {
            budget = budget.saturating_add(2 * (self.msrc_dss_tcc_us + DSS_OVERHEAD_US));
        } else if steps.msrc {
            budget = budget.saturating_add(self.msrc_dss_tcc_us + MSRC_OVERHEAD_US);
        }
        if steps.pre_range {
            budget = budget.saturating_add(self.pre_range_us + PRE_RANGE_OVERHEAD_US);
        }
        budget
    }
}

fn decode_vcsel_period(reg: u8) -> u32 {
    (u32::from(reg) + 1) << 1
}

/// Macro period in nanoseconds for a VCSEL period in PCLKs
fn macro_period_ns(vcsel_pclks: u32) -> u64 {
    (2304 * u64::from(vcsel_pclks) * 1655 + 500) / 1000
}

fn timeout_mclks_to_us(mclks: u32, vcsel_pclks: u32) -> u32 {
    let us = (u64::from(mclks) * macro_period_ns(vcsel_pclks) + 500) / 1000;
    u32::try_from(us).unwrap_or(u32::MAX)
}

fn timeout_us_to_mclks(us: u32, vcsel_pclks: u32) -> u32 {
    let period = macro_period_ns(vcsel_pclks).max(1);
    let mclks = (u64::from(us) * 1000 + period / 2) / period;
    u32::try_from(mclks).unwrap_or(u32::MAX)
}

/// Decode a `(lsb << msb) + 1` timeout register
fn decode_timeout(reg: u16) -> u32 {
    let lsb = u32::from(reg & 0x00FF);
    let msb = u32::from(reg >> 8);
    lsb.checked_shl(msb).unwrap_or(u32::MAX).saturating_add(1)
}

fn encode_timeout(mclks: u32) -> u16 {
    if mclks == 0 {
        return 0;
    }
    let mut lsb = mclks - 1;
    let mut msb: u16 = 0;
    while lsb > 0xFF {
        lsb >>= 1;
        msb += 1;
    }
    (msb << 8) | lsb as u16
}

/// Keep the first `count` available reference SPADs enabled, clear the rest
fn select_ref_spads(map: &mut [u8; 6], count: u8, is_aperture: bool) {
    let first = if is_aperture { FIRST_APERTURE_SPAD } else { 0 };
    let mut enabled = 0u8;
    for i in 0..REF_SPAD_COUNT {
        let (byte, bit) = (i / 8, i % 8);
        if i < first || enabled == count {
            map[byte] &= !(1 << bit);
        } else if (map[byte] >> bit) & 0x01 != 0 {
            enabled += 1;
        }
    }
}

/// VL53L0X on an I2C bus
pub struct Vl53l0x<I2C> {
    i2c: I2C,
    address: u8,
    stop_variable: u8,
    timing_budget_us: u32,
}

impl<I2C: I2c> Vl53l0x<I2C> {
    /// Create a driver for a sensor at [`DEFAULT_ADDRESS`]
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a driver for a sensor at a custom address
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            stop_variable: 0,
            timing_budget_us: 0,
        }
    }

    /// Timing budget applied during the last boot, in microseconds
    pub fn timing_budget_us(&self) -> u32 {
        self.timing_budget_us
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Read the model ID register
    pub fn model_id(&mut self) -> Result<u8, RangingError<I2C::Error>> {
        self.read_reg(reg::IDENTIFICATION_MODEL_ID)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, RangingError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), RangingError<I2C::Error>> {
        self.i2c.write(self.address, &[reg, value])?;
        Ok(())
    }

    fn read_reg16(&mut self, reg: u8) -> Result<u16, RangingError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_reg16(&mut self, reg: u8, value: u16) -> Result<(), RangingError<I2C::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[reg, hi, lo])?;
        Ok(())
    }

    fn update_reg(
        &mut self,
        reg: u8,
        f: impl FnOnce(u8) -> u8,
    ) -> Result<(), RangingError<I2C::Error>> {
        let value = self.read_reg(reg)?;
        self.write_reg(reg, f(value))
    }

    /// Enter the private register page holding the stop variable
    fn open_private_page(&mut self) -> Result<(), RangingError<I2C::Error>> {
        self.write_reg(0x80, 0x01)?;
        self.write_reg(0xFF, 0x01)?;
        self.write_reg(0x00, 0x00)
    }

    fn close_private_page(&mut self) -> Result<(), RangingError<I2C::Error>> {
        self.write_reg(0x00, 0x01)?;
        self.write_reg(0xFF, 0x00)?;
        self.write_reg(0x80, 0x00)
    }

    /// Poll a register until `done` accepts its value
    fn poll_reg(
        &mut self,
        reg: u8,
        done: impl Fn(u8) -> bool,
    ) -> Result<(), RangingError<I2C::Error>> {
        for _ in 0..DATA_READY_POLLS {
            if done(self.read_reg(reg)?) {
                return Ok(());
            }
        }
        Err(RangingError::Timeout)
    }

    fn wait_data_ready(&mut self) -> Result<(), RangingError<I2C::Error>> {
        self.poll_reg(reg::RESULT_INTERRUPT_STATUS, |v| v & 0x07 != 0)
    }

    /// Read the reference SPAD count and type from NVM
    fn spad_info(&mut self) -> Result<(u8, bool), RangingError<I2C::Error>> {
        self.open_private_page()?;
        self.write_reg(0xFF, 0x06)?;
        self.update_reg(0x83, |v| v | 0x04)?;
        self.write_reg(0xFF, 0x07)?;
        self.write_reg(0x81, 0x01)?;
        self.write_reg(0x80, 0x01)?;
        self.write_reg(0x94, 0x6B)?;
        self.write_reg(0x83, 0x00)?;

        self.poll_reg(0x83, |v| v != 0)?;
        self.write_reg(0x83, 0x01)?;
        let info = self.read_reg(0x92)?;

        self.write_reg(0x81, 0x00)?;
        self.write_reg(0xFF, 0x06)?;
        self.update_reg(0x83, |v| v & !0x04)?;
        self.write_reg(0xFF, 0x01)?;
        self.close_private_page()?;

        Ok((info & 0x7F, info & 0x80 != 0))
    }

    /// Enable the reference SPADs reported by NVM
    fn configure_ref_spads(&mut self) -> Result<(), RangingError<I2C::Error>> {
        let (count, is_aperture) = self.spad_info()?;

        let mut map = [0u8; 6];
        self.i2c.write_read(
            self.address,
            &[reg::GLOBAL_CONFIG_SPAD_ENABLES_REF_0],
            &mut map,
        )?;

        self.write_reg(0xFF, 0x01)?;
        self.write_reg(reg::DYNAMIC_SPAD_REF_EN_START_OFFSET, 0x00)?;
        self.write_reg(reg::DYNAMIC_SPAD_NUM_REQUESTED_REF_SPAD, 0x2C)?;
        self.write_reg(0xFF, 0x00)?;
        self.write_reg(reg::GLOBAL_CONFIG_REF_EN_START_SELECT, 0xB4)?;

        select_ref_spads(&mut map, count, is_aperture);

        let mut frame = [0u8; 7];
        frame[0] = reg::GLOBAL_CONFIG_SPAD_ENABLES_REF_0;
        frame[1..].copy_from_slice(&map);
        self.i2c.write(self.address, &frame)?;
        Ok(())
    }

    fn sequence_steps(&mut self) -> Result<SequenceSteps, RangingError<I2C::Error>> {
        let seq = self.read_reg(reg::SYSTEM_SEQUENCE_CONFIG)?;
        Ok(SequenceSteps::from_config(seq))
    }

    fn step_timeouts(
        &mut self,
        steps: &SequenceSteps,
    ) -> Result<StepTimeouts, RangingError<I2C::Error>> {
        let pre_range_vcsel_pclks =
            decode_vcsel_period(self.read_reg(reg::PRE_RANGE_CONFIG_VCSEL_PERIOD)?);
        let msrc_dss_tcc_mclks = u32::from(self.read_reg(reg::MSRC_CONFIG_TIMEOUT_MACROP)?) + 1;
        let pre_range_mclks =
            decode_timeout(self.read_reg16(reg::PRE_RANGE_CONFIG_TIMEOUT_MACROP_HI)?);

        let final_range_vcsel_pclks =
            decode_vcsel_period(self.read_reg(reg::FINAL_RANGE_CONFIG_VCSEL_PERIOD)?);
        let mut final_range_mclks =
            decode_timeout(self.read_reg16(reg::FINAL_RANGE_CONFIG_TIMEOUT_MACROP_HI)?);
        // Final range timeout includes the pre-range timeout
        if steps.pre_range {
            final_range_mclks = final_range_mclks.saturating_sub(pre_range_mclks);
        }

        Ok(StepTimeouts {
            final_range_vcsel_pclks,
            pre_range_mclks,
            msrc_dss_tcc_us: timeout_mclks_to_us(msrc_dss_tcc_mclks, pre_range_vcsel_pclks),
            pre_range_us: timeout_mclks_to_us(pre_range_mclks, pre_range_vcsel_pclks),
            final_range_us: timeout_mclks_to_us(final_range_mclks, final_range_vcsel_pclks),
        })
    }

    /// Read the measurement timing budget the device is configured for
    pub fn measurement_timing_budget(&mut self) -> Result<u32, RangingError<I2C::Error>> {
        let steps = self.sequence_steps()?;
        let timeouts = self.step_timeouts(&steps)?;

        let mut budget = timeouts.fixed_us(&steps);
        if steps.final_range {
            budget = budget
                .saturating_add(timeouts.final_range_us + FINAL_RANGE_OVERHEAD_US);
        }
        Ok(budget)
    }

    /// Give the final range step whatever the other steps leave of `budget_us`
    pub fn set_measurement_timing_budget(
        &mut self,
        budget_us: u32,
    ) -> Result<(), RangingError<I2C::Error>> {
        if budget_us < MIN_TIMING_BUDGET_US {
            return Err(RangingError::TimingBudgetTooShort(budget_us));
        }

        let steps = self.sequence_steps()?;
        let timeouts = self.step_timeouts(&steps)?;

        if steps.final_range {
            let used = timeouts.fixed_us(&steps).saturating_add(FINAL_RANGE_OVERHEAD_US);
            if used > budget_us {
                return Err(RangingError::TimingBudgetTooShort(budget_us));
            }

            let mut final_range_mclks =
                timeout_us_to_mclks(budget_us - used, timeouts.final_range_vcsel_pclks);
            if steps.pre_range {
                final_range_mclks = final_range_mclks.saturating_add(timeouts.pre_range_mclks);
            }
            self.write_reg16(
                reg::FINAL_RANGE_CONFIG_TIMEOUT_MACROP_HI,
                encode_timeout(final_range_mclks),
            )?;
        }

        self.timing_budget_us = budget_us;
        Ok(())
    }

    fn single_ref_calibration(&mut self, vhv_init: u8) -> Result<(), RangingError<I2C::Error>> {
        self.write_reg(reg::SYSRANGE_START, 0x01 | vhv_init)?;
        self.wait_data_ready()?;
        self.write_reg(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)?;
        self.write_reg(reg::SYSRANGE_START, 0x00)
    }
}

impl<I2C: I2c> RangeSensor for Vl53l0x<I2C> {
    type Error = RangingError<I2C::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        let id = self.model_id()?;
        if id != MODEL_ID {
            return Err(RangingError::InvalidModelId(id));
        }

        // 2V8 I/O mode
        self.update_reg(reg::VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV, |v| v | 0x01)?;
        // Standard I2C mode
        self.write_reg(0x88, 0x00)?;

        self.open_private_page()?;
        self.stop_variable = self.read_reg(0x91)?;
        self.close_private_page()?;

        // Disable MSRC and pre-range signal rate limit checks
        self.update_reg(reg::MSRC_CONFIG_CONTROL, |v| v | 0x12)?;
        self.write_reg16(reg::FINAL_RANGE_MIN_COUNT_RATE_RTN_LIMIT, SIGNAL_RATE_LIMIT)?;
        self.write_reg(reg::SYSTEM_SEQUENCE_CONFIG, 0xFF)?;

        self.configure_ref_spads()?;

        for &(r, v) in TUNING {
            self.write_reg(r, v)?;
        }

        // Interrupt on new sample ready, active low
        self.write_reg(reg::SYSTEM_INTERRUPT_CONFIG_GPIO, 0x04)?;
        self.update_reg(reg::GPIO_HV_MUX_ACTIVE_HIGH, |v| v & !0x10)?;
        self.write_reg(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        let budget_us = self.measurement_timing_budget()?;

        // Skip MSRC and TCC in the default sequence, then hand the time
        // they used to the final range step
        self.write_reg(reg::SYSTEM_SEQUENCE_CONFIG, 0xE8)?;
        self.set_measurement_timing_budget(budget_us)?;

        // VHV calibration
        self.write_reg(reg::SYSTEM_SEQUENCE_CONFIG, 0x01)?;
        self.single_ref_calibration(0x40)?;

        // Phase calibration
        self.write_reg(reg::SYSTEM_SEQUENCE_CONFIG, 0x02)?;
        self.single_ref_calibration(0x00)?;

        self.write_reg(reg::SYSTEM_SEQUENCE_CONFIG, 0xE8)
    }

    fn start_range_continuous(&mut self) -> Result<(), Self::Error> {
        self.open_private_page()?;
        self.write_reg(0x91, self.stop_variable)?;
        self.close_private_page()?;

        // Back-to-back mode
        self.write_reg(reg::SYSRANGE_START, 0x02)
    }

    fn ranging_test(&mut self) -> Result<RangeMeasurement, Self::Error> {
        self.wait_data_ready()?;

        let mut buf = [0u8; 12];
        self.i2c
            .write_read(self.address, &[reg::RESULT_RANGE_STATUS], &mut buf)?;
        self.write_reg(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        let device_status = (buf[0] & 0x78) >> 3;
        let range_mm = u16::from_be_bytes([buf[10], buf[11]]);

        Ok(RangeMeasurement::new(status_code(device_status), range_mm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use std::vec::Vec;
    use sweepscan_core::traits::RangeStatus;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct BusError;

    impl embedded_hal::i2c::Error for BusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Flat register file; page select writes are ignored
    struct FakeBus {
        regs: [u8; 256],
        writes: Vec<(u8, u8)>,
        fail: bool,
        nvm_ready: bool,
    }

    impl FakeBus {
        fn new() -> Self {
            let mut regs = [0u8; 256];
            regs[reg::IDENTIFICATION_MODEL_ID as usize] = MODEL_ID;
            regs[reg::RESULT_INTERRUPT_STATUS as usize] = 0x04;
            regs[0x91] = 0x3C;
            // NVM: 5 reference SPADs, aperture type
            regs[0x92] = 0x85;
            regs[0xB0..0xB6].fill(0xFF);
            Self {
                regs,
                writes: Vec::new(),
                fail: false,
                nvm_ready: true,
            }
        }

        fn wrote(&self, reg: u8, value: u8) -> bool {
            self.writes.contains(&(reg, value))
        }

        fn set_result(&mut self, device_status: u8, range_mm: u16) {
            let base = reg::RESULT_RANGE_STATUS as usize;
            self.regs[base] = device_status << 3;
            self.regs[base + 10..base + 12].copy_from_slice(&range_mm.to_be_bytes());
        }
    }

    impl ErrorType for FakeBus {
        type Error = BusError;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            assert_eq!(address, DEFAULT_ADDRESS);
            if self.fail {
                return Err(BusError);
            }

            let mut pointer = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        pointer = bytes[0] as usize;
                        for (i, &b) in bytes[1..].iter().enumerate() {
                            self.regs[pointer + i] = b;
                            self.writes.push(((pointer + i) as u8, b));
                        }
                    }
                    Operation::Read(buf) => {
                        buf.copy_from_slice(&self.regs[pointer..pointer + buf.len()]);
                        if pointer == 0x83 && self.nvm_ready {
                            buf[0] |= 0x10;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_begin_configures_and_calibrates() {
        let mut sensor = Vl53l0x::new(FakeBus::new());
        assert_eq!(sensor.begin(), Ok(()));
        assert_eq!(sensor.stop_variable, 0x3C);

        let bus = sensor.release();
        assert!(bus.wrote(reg::SYSRANGE_START, 0x41));
        assert!(bus.wrote(reg::SYSRANGE_START, 0x01));
        assert!(bus.wrote(reg::SYSTEM_INTERRUPT_CONFIG_GPIO, 0x04));
        assert_eq!(bus.regs[reg::SYSTEM_SEQUENCE_CONFIG as usize], 0xE8);
        assert_eq!(bus.regs[reg::SYSRANGE_START as usize], 0x00);
        assert_eq!(bus.regs[reg::VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV as usize] & 0x01, 0x01);
    }

    #[test]
    fn test_begin_enables_reference_spads() {
        let mut sensor = Vl53l0x::new(FakeBus::new());
        sensor.begin().unwrap();

        let bus = sensor.release();
        assert!(bus.wrote(reg::DYNAMIC_SPAD_REF_EN_START_OFFSET, 0x00));
        assert!(bus.wrote(reg::DYNAMIC_SPAD_NUM_REQUESTED_REF_SPAD, 0x2C));
        assert_eq!(bus.regs[reg::GLOBAL_CONFIG_REF_EN_START_SELECT as usize], 0xB4);
        // Aperture SPADs start at 12, first five kept
        assert_eq!(bus.regs[0xB0..0xB6], [0x00, 0xF0, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_begin_nvm_never_ready() {
        let mut bus = FakeBus::new();
        bus.nvm_ready = false;
        let mut sensor = Vl53l0x::new(bus);
        assert_eq!(sensor.begin(), Err(RangingError::Timeout));
    }

    #[test]
    fn test_begin_keeps_timing_budget() {
        let mut sensor = Vl53l0x::new(FakeBus::new());
        sensor.begin().unwrap();
        assert_eq!(sensor.timing_budget_us(), 28722);
        // Timeout register encoding rounds the readback
        let readback = sensor.measurement_timing_budget().unwrap();
        assert!((28_700..28_750).contains(&readback));

        // Time freed by dropping MSRC and TCC goes to the final range step
        let bus = sensor.release();
        assert_eq!(bus.regs[reg::FINAL_RANGE_CONFIG_TIMEOUT_MACROP_HI as usize], 0x02);
        assert_eq!(bus.regs[reg::FINAL_RANGE_CONFIG_TIMEOUT_MACROP_HI as usize + 1], 0x85);
    }

    #[test]
    fn test_timing_budget_too_short() {
        let mut sensor = Vl53l0x::new(FakeBus::new());
        sensor.begin().unwrap();
        assert_eq!(
            sensor.set_measurement_timing_budget(19_999),
            Err(RangingError::TimingBudgetTooShort(19_999))
        );
        assert_eq!(sensor.timing_budget_us(), 28722);
    }

    #[test]
    fn test_timeout_register_encoding() {
        assert_eq!(decode_timeout(0x0285), 533);
        assert_eq!(encode_timeout(533), 0x0285);
        assert_eq!(encode_timeout(0), 0);
        assert_eq!(decode_vcsel_period(0x06), 14);
    }

    #[test]
    fn test_begin_rejects_wrong_model() {
        let mut bus = FakeBus::new();
        bus.regs[reg::IDENTIFICATION_MODEL_ID as usize] = 0xAA;
        let mut sensor = Vl53l0x::new(bus);

        assert_eq!(sensor.begin(), Err(RangingError::InvalidModelId(0xAA)));
        assert!(sensor.release().writes.is_empty());
    }

    #[test]
    fn test_begin_bus_failure() {
        let mut bus = FakeBus::new();
        bus.fail = true;
        let mut sensor = Vl53l0x::new(bus);
        assert_eq!(sensor.begin(), Err(RangingError::Bus(BusError)));
    }

    #[test]
    fn test_start_continuous_restores_stop_variable() {
        let mut sensor = Vl53l0x::new(FakeBus::new());
        sensor.begin().unwrap();
        sensor.start_range_continuous().unwrap();

        let bus = sensor.release();
        assert!(bus.wrote(0x91, 0x3C));
        assert_eq!(bus.writes.last(), Some(&(reg::SYSRANGE_START, 0x02)));
    }

    #[test]
    fn test_ranging_test_decodes_result() {
        let mut bus = FakeBus::new();
        bus.set_result(11, 150);
        let mut sensor = Vl53l0x::new(bus);

        let m = sensor.ranging_test().unwrap();
        assert_eq!(m.range_status, RangeStatus::Valid);
        assert_eq!(m.range_mm, 150);

        let bus = sensor.release();
        assert_eq!(bus.writes, [(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)]);
    }

    #[test]
    fn test_ranging_test_out_of_range() {
        let mut bus = FakeBus::new();
        bus.set_result(6, 8191);
        let mut sensor = Vl53l0x::new(bus);

        let m = sensor.ranging_test().unwrap();
        assert_eq!(m.range_status, RangeStatus::OutOfRange);
        assert_eq!(m.range_mm, 8191);
    }

    #[test]
    fn test_ranging_test_times_out() {
        let mut bus = FakeBus::new();
        bus.regs[reg::RESULT_INTERRUPT_STATUS as usize] = 0;
        let mut sensor = Vl53l0x::new(bus);
        assert_eq!(sensor.ranging_test(), Err(RangingError::Timeout));
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(status_code(11), 0);
        assert_eq!(status_code(5), 0);
        assert_eq!(status_code(4), 2);
        assert_eq!(status_code(8), 3);
        assert_eq!(status_code(10), 3);
        assert_eq!(status_code(6), 4);
        assert_eq!(status_code(9), 4);
        assert_eq!(status_code(1), 5);
        assert_eq!(status_code(3), 5);
        assert_eq!(status_code(0), 0);
    }
}
