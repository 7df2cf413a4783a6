//! STM32F1-specific HAL for the Shiftlink firmware
//!
//! Implements the `shiftlink-hal` traits for the I2C v1 peripheral found
//! on the STM32F1 family:
//!
//! - STM32F103C8 / STM32F103CB (Blue Pill)
//!
//! # Features
//!
//! - `stm32f103c8` - Enable support for STM32F103C8T6
//! - `stm32f103cb` - Enable support for STM32F103CBT6
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Bring the peripheral up (clocks, pins, timing) with embassy-stm32, keep
//! that driver alive, then hand [`i2c::I2cRegisters`] to the target driver
//! for register-level control from the interrupt handlers.

#![no_std]

pub mod i2c;
pub mod interrupt;
pub mod uart;

pub use i2c::I2cRegisters;
pub use interrupt::NvicLine;
