//! Hardware driver implementations
//!
//! This crate provides the drivers built on the register traits defined in
//! shiftlink-hal:
//!
//! - I2C target (bus slave) driven from the event and error interrupts,
//!   buffering controller writes and answering controller reads

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod i2c_target;
