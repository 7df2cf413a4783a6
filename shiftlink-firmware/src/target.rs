//! Target driver instance and its interrupt handlers
//!
//! The interrupt half of the driver lives in [`TARGET`] so the handlers can
//! reach it. The main loop only takes the lock to read counters; received
//! bytes go through the lock-free reader instead.

use core::cell::RefCell;

use embassy_stm32::interrupt::typelevel::{Handler, I2C1_ER, I2C1_EV};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use shiftlink_drivers::i2c_target::{BusError, I2cTarget, TargetStats};
use shiftlink_hal_stm32f1::I2cRegisters;

use crate::channels::{TransferFault, BUS_FAULT, TRANSFER_FAULT};

/// Receive buffer size (one slot is kept free)
pub const RX_BUFFER_SIZE: usize = 128;

pub type WheelTarget = I2cTarget<'static, I2cRegisters, RX_BUFFER_SIZE>;

/// The one target instance, installed once at start-up
pub static TARGET: Mutex<CriticalSectionRawMutex, RefCell<Option<WheelTarget>>> =
    Mutex::new(RefCell::new(None));

/// I2C1 event interrupt
pub struct EventHandler;

impl Handler<I2C1_EV> for EventHandler {
    unsafe fn on_interrupt() {
        // The transfer is over by the time the dump is taken, so reading
        // SR1 then SR2 cannot acknowledge another address match
        let fault = TARGET.lock(|cell| {
            let mut slot = cell.borrow_mut();
            let target = slot.as_mut()?;
            match target.on_event().transfer {
                Some(Err(error)) => Some(TransferFault {
                    error,
                    status: target.status_snapshot(),
                }),
                _ => None,
            }
        });

        if let Some(fault) = fault {
            TRANSFER_FAULT.signal(fault);
        }
    }
}

/// I2C1 error interrupt
pub struct ErrorHandler;

impl Handler<I2C1_ER> for ErrorHandler {
    unsafe fn on_interrupt() {
        let report = TARGET.lock(|cell| cell.borrow_mut().as_mut().map(|target| target.on_error()));

        if let Some(report) = report {
            if report.iter().any(|error| error != BusError::Nack) {
                BUS_FAULT.signal(report);
            }
        }
    }
}

/// Current counters, if the target is installed
pub fn stats() -> Option<TargetStats> {
    TARGET.lock(|cell| cell.borrow().as_ref().map(|target| target.stats()))
}
