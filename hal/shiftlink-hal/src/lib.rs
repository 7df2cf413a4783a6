//! Shiftlink Hardware Abstraction Layer
//!
//! This crate defines the register-level traits the I2C target driver is
//! written against. Chip-specific HALs implement them for real silicon and
//! the driver crate implements them for a mock register block on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (shiftlink-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  shiftlink-drivers (I2C target driver)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  shiftlink-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  shiftlink-hal-stm32f1                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cTargetRegs`] - Register access for an I2C peripheral in target mode
//! - [`interrupt::InterruptLine`] - One NVIC line (priority, enable, disable)

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod interrupt;

// Re-export key traits at crate root for convenience
pub use i2c::{AddressSlot, I2cTargetRegs};
pub use interrupt::InterruptLine;
