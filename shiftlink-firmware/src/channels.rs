//! Interrupt-to-main-loop signals
//!
//! The interrupt handlers never log; anything worth reporting is forwarded
//! here and picked up on the next poll.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use shiftlink_drivers::i2c_target::{ErrorReport, StatusSnapshot, TransmitError};

/// A response transfer that failed, with SR1/SR2 as the interrupt left them
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct TransferFault {
    pub error: TransmitError,
    pub status: StatusSnapshot,
}

/// Last response transfer that failed (NACK or timeout)
pub static TRANSFER_FAULT: Signal<CriticalSectionRawMutex, TransferFault> = Signal::new();

/// Last error interrupt that raised more than the end-of-read NACK
pub static BUS_FAULT: Signal<CriticalSectionRawMutex, ErrorReport> = Signal::new();
