//! Interrupt-driven I2C target
//!
//! Turns the I2C peripheral into an addressable bus target. Controller
//! writes are buffered byte by byte from the event interrupt; controller
//! reads are answered with a fixed response payload.
//!
//! # Usage
//!
//! ```ignore
//! static BUFFER: StaticCell<RxBuffer<128>> = StaticCell::new();
//!
//! let buffer = BUFFER.init(RxBuffer::new());
//! let (mut target, mut reader) = I2cTarget::configure(regs, &TargetConfig::default(), buffer)?;
//! target.install_interrupt(&mut event_line, 0);
//!
//! // event interrupt
//! let report = target.on_event();
//!
//! // main loop
//! let n = reader.read(&mut frame);
//! ```
//!
//! The interrupt half and the main-loop half share only the receive
//! buffer, which is single-producer single-consumer and needs no lock.

pub mod ring;
pub mod status;
pub mod target;
pub mod transmit;

#[cfg(test)]
pub(crate) mod mock;

pub use ring::{RxBuffer, RxConsumer, RxError, RxProducer};
pub use status::{StatusError, StatusFlag, StatusRegister, StatusSnapshot, StatusView};
pub use target::{
    BusError, ConfigError, ErrorReport, EventReport, I2cTarget, TargetConfig, TargetReader,
    TargetStats, DEFAULT_ADDRESS, DEFAULT_RESPONSE, MAX_RESPONSE_LEN,
};
pub use transmit::{TransferOutcome, TransmitError, TransmitSequencer, DEFAULT_RETRY_BUDGET};
