//! I2C for STM32F1
//!
//! [`I2cRegisters`] gives the target driver raw access to an I2C v1 register
//! block. Bus bring-up (clock enable, pin mux, timing) is left to
//! `embassy_stm32::i2c::I2c`; the firmware keeps that driver alive for as
//! long as the target runs.
//!
//! The controller side (shifter) uses the embassy driver directly;
//! [`I2cConfig`] and [`I2cBusError`] cover that path.

use embassy_stm32::i2c::Error as I2cError;
use embassy_stm32::pac;
use embassy_stm32::pac::i2c::regs::{Oar1, Oar2, Sr1};
use embassy_stm32::time::Hertz;
use shiftlink_hal::i2c::{AddressSlot, I2cTargetRegs};

/// OAR1 bit 14 must be kept at 1 by software (RM0008)
const OAR1_RESERVED_ONE: u32 = 1 << 14;

/// Register-level handle on one I2C peripheral
pub struct I2cRegisters {
    regs: pac::i2c::I2c,
}

impl I2cRegisters {
    /// I2C1 (PB6 SCL / PB7 SDA)
    pub fn i2c1() -> Self {
        Self { regs: pac::I2C1 }
    }

    /// I2C2 (PB10 SCL / PB11 SDA)
    pub fn i2c2() -> Self {
        Self { regs: pac::I2C2 }
    }
}

impl I2cTargetRegs for I2cRegisters {
    fn read_status1(&mut self) -> u16 {
        self.regs.sr1().read().0 as u16
    }

    fn read_status2(&mut self) -> u16 {
        self.regs.sr2().read().0 as u16
    }

    fn write_status1(&mut self, value: u16) {
        self.regs.sr1().write_value(Sr1(u32::from(value)));
    }

    fn read_data(&mut self) -> u8 {
        self.regs.dr().read().dr()
    }

    fn write_data(&mut self, byte: u8) {
        self.regs.dr().write(|w| w.set_dr(byte));
    }

    fn modify_control1(&mut self, set: u16, clear: u16) {
        self.regs
            .cr1()
            .modify(|w| w.0 = (w.0 | u32::from(set)) & !u32::from(clear));
    }

    fn modify_control2(&mut self, set: u16, clear: u16) {
        self.regs
            .cr2()
            .modify(|w| w.0 = (w.0 | u32::from(set)) & !u32::from(clear));
    }

    fn write_own_address(&mut self, slot: AddressSlot, value: u16) {
        match slot {
            AddressSlot::Primary => self
                .regs
                .oar1()
                .write_value(Oar1(u32::from(value) | OAR1_RESERVED_ONE)),
            AddressSlot::Dual => self.regs.oar2().write_value(Oar2(u32::from(value))),
        }
    }
}

/// Controller-mode I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// SCL frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // Standard mode, what the wheel base expects
        }
    }
}

impl I2cConfig {
    /// Convert to the embassy driver configuration
    pub fn to_embassy(&self) -> embassy_stm32::i2c::Config {
        let mut config = embassy_stm32::i2c::Config::default();
        config.frequency = Hertz(self.frequency);
        config
    }
}

/// Error from controller-mode I2C operations
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Timeout
    Timeout,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<I2cError> for I2cBusError {
    fn from(e: I2cError) -> Self {
        match e {
            I2cError::Bus => I2cBusError::Bus,
            I2cError::Arbitration => I2cBusError::ArbitrationLost,
            I2cError::Nack => I2cBusError::Nack,
            I2cError::Timeout => I2cBusError::Timeout,
            I2cError::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}
