//! Driver façade and interrupt handlers
//!
//! [`I2cTarget`] owns the register block and the interrupt half of the
//! receive buffer. [`TargetReader`] is the main-loop half. The platform
//! calls [`I2cTarget::on_event`] from the event interrupt and
//! [`I2cTarget::on_error`] from the error interrupt.

use heapless::Vec;
use shiftlink_hal::i2c::{cr1, cr2, AddressSlot, I2cTargetRegs};
use shiftlink_hal::InterruptLine;

use super::ring::{RxBuffer, RxConsumer, RxError, RxProducer};
use super::status::{StatusFlag, StatusSnapshot, StatusView};
use super::transmit::{TransferOutcome, TransmitError, TransmitSequencer, DEFAULT_RETRY_BUDGET};

/// Address used when none is configured
pub const DEFAULT_ADDRESS: u8 = 0xAA;

/// Payload answered to every controller read
pub const DEFAULT_RESPONSE: [u8; 5] = [0xDE, 0xED, 0xBE, 0xEF, 0x00];

/// Largest response payload the driver stores
pub const MAX_RESPONSE_LEN: usize = 32;

/// ADD2 field of OAR2 (bits 7:1), ENDUAL left clear
const OAR2_ADDRESS_MASK: u16 = 0x00FE;

/// Target configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetConfig {
    /// Bus address, programmed shifted left by one
    pub address: u8,
    /// Status polls per transmit wait
    pub retry_budget: u32,
    /// Bytes sent back on a controller read
    pub response: &'static [u8],
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            retry_budget: DEFAULT_RETRY_BUDGET,
            response: &DEFAULT_RESPONSE,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Response payload exceeds [`MAX_RESPONSE_LEN`]
    ResponseTooLong,
}

/// What one event interrupt did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventReport {
    /// Bus was busy and ACK was re-enabled
    pub ack_rearmed: bool,
    /// Byte taken from the data register
    pub received: Option<u8>,
    /// The received byte did not fit in the buffer
    pub dropped: bool,
    /// Outcome of the response transfer, if one ran
    pub transfer: Option<TransferOutcome>,
    /// Stop condition acknowledged
    pub stop: bool,
}

impl EventReport {
    /// Whether the response transfer ran and failed
    pub fn transfer_failed(&self) -> bool {
        matches!(self.transfer, Some(Err(_)))
    }
}

/// Error condition raised on the error interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Misplaced start or stop (BERR)
    Bus,
    /// Arbitration lost (ARLO)
    Arbitration,
    /// Acknowledge failure (AF)
    Nack,
    /// Overrun or underrun (OVR)
    Overrun,
    /// PEC mismatch (PECERR)
    PecError,
    /// SMBus clock timeout (TIMEOUT)
    Timeout,
    /// SMBus alert (SMBALERT)
    SmbAlert,
}

impl BusError {
    /// Every error the error line can report
    pub const ALL: [BusError; 7] = [
        BusError::Bus,
        BusError::Arbitration,
        BusError::Nack,
        BusError::Overrun,
        BusError::PecError,
        BusError::Timeout,
        BusError::SmbAlert,
    ];

    /// Status flag that signals this error
    pub const fn flag(self) -> StatusFlag {
        match self {
            BusError::Bus => StatusFlag::BERR,
            BusError::Arbitration => StatusFlag::ARLO,
            BusError::Nack => StatusFlag::AF,
            BusError::Overrun => StatusFlag::OVR,
            BusError::PecError => StatusFlag::PECERR,
            BusError::Timeout => StatusFlag::TIMEOUT,
            BusError::SmbAlert => StatusFlag::SMBALERT,
        }
    }
}

/// Errors seen by one error interrupt, as the raw SR1 error bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorReport {
    /// SR1 masks of the flags that were set, ORed together
    pub raised: u16,
}

impl ErrorReport {
    /// Whether `error` was raised
    pub fn contains(&self, error: BusError) -> bool {
        self.raised & error.flag().mask() != 0
    }

    /// No error flag was set
    pub fn is_empty(&self) -> bool {
        self.raised == 0
    }

    /// Raised errors in [`BusError::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = BusError> + '_ {
        BusError::ALL.into_iter().filter(move |error| self.contains(*error))
    }
}

/// Running counters, saturating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetStats {
    /// Bytes stored in the receive buffer
    pub bytes_received: u32,
    /// Bytes discarded because the buffer was full
    pub bytes_dropped: u32,
    /// Responses sent in full
    pub responses_sent: u32,
    /// Responses cut short by NACK or stop, plus AF on the error line
    pub nacks: u32,
    /// Responses abandoned when the retry budget ran out
    pub timeouts: u32,
    /// Stop conditions acknowledged
    pub stops: u32,
    /// BERR, PECERR, TIMEOUT and SMBALERT
    pub bus_errors: u32,
    /// Arbitration lost (ARLO)
    pub arbitration_lost: u32,
    /// Overrun or underrun (OVR)
    pub overruns: u32,
}

impl TargetStats {
    fn record_transfer(&mut self, outcome: TransferOutcome) {
        let counter = match outcome {
            Ok(()) => &mut self.responses_sent,
            Err(TransmitError::Nack) => &mut self.nacks,
            Err(TransmitError::Timeout) => &mut self.timeouts,
        };
        *counter = counter.saturating_add(1);
    }

    fn record_error(&mut self, error: BusError) {
        let counter = match error {
            BusError::Nack => &mut self.nacks,
            BusError::Arbitration => &mut self.arbitration_lost,
            BusError::Overrun => &mut self.overruns,
            BusError::Bus | BusError::PecError | BusError::Timeout | BusError::SmbAlert => {
                &mut self.bus_errors
            }
        };
        *counter = counter.saturating_add(1);
    }
}

/// I2C peripheral operated as a bus target
pub struct I2cTarget<'a, R, const N: usize> {
    regs: R,
    address: u8,
    sequencer: TransmitSequencer,
    response: Vec<u8, MAX_RESPONSE_LEN>,
    rx: RxProducer<'a, N>,
    stats: TargetStats,
}

impl<'a, R: I2cTargetRegs, const N: usize> I2cTarget<'a, R, N> {
    /// Program the address and acknowledge mode, and split the receive buffer
    ///
    /// The address goes into both own-address registers shifted left by
    /// one; OAR2 keeps only bits 7:1. ACK and POS are enabled. Interrupts
    /// stay off until [`install_interrupt`](Self::install_interrupt).
    pub fn configure(
        mut regs: R,
        config: &TargetConfig,
        buffer: &'a mut RxBuffer<N>,
    ) -> Result<(Self, TargetReader<'a, N>), ConfigError> {
        let response =
            Vec::from_slice(config.response).map_err(|_| ConfigError::ResponseTooLong)?;

        let oar = u16::from(config.address) << 1;
        regs.write_own_address(AddressSlot::Primary, oar);
        regs.write_own_address(AddressSlot::Dual, oar & OAR2_ADDRESS_MASK);
        regs.set_control1(cr1::ACK | cr1::POS);

        let (rx, consumer) = buffer.split();

        Ok((
            Self {
                regs,
                address: config.address,
                sequencer: TransmitSequencer::new(config.retry_budget),
                response,
                rx,
                stats: TargetStats::default(),
            },
            TargetReader { rx: consumer },
        ))
    }

    /// Enable the event and buffer interrupt sources and arm the event line
    pub fn install_interrupt<L: InterruptLine>(&mut self, line: &mut L, priority: u8) {
        self.regs.modify_control2(cr2::ITEVTEN | cr2::ITBUFEN, 0);
        line.set_priority(priority);
        line.enable();
    }

    /// Enable the error interrupt source and arm the error line
    pub fn install_error_interrupt<L: InterruptLine>(&mut self, line: &mut L, priority: u8) {
        self.regs.modify_control2(cr2::ITERREN, 0);
        line.set_priority(priority);
        line.enable();
    }

    /// Event interrupt handler
    ///
    /// The four checks are independent: a stop condition can arrive in the
    /// same invocation as the last received byte.
    pub fn on_event(&mut self) -> EventReport {
        let mut report = EventReport::default();

        if self.status().has(StatusFlag::BUSY) {
            self.regs.set_control1(cr1::ACK);
            report.ack_rearmed = true;
        }

        if self.status().has(StatusFlag::RXNE) {
            let byte = self.regs.read_data();
            report.received = Some(byte);
            if self.rx.put(byte) {
                self.stats.bytes_received = self.stats.bytes_received.saturating_add(1);
            } else {
                report.dropped = true;
                self.stats.bytes_dropped = self.stats.bytes_dropped.saturating_add(1);
            }
            self.regs.set_control1(cr1::ACK);
        }

        if self.status().has(StatusFlag::TXE) {
            let outcome = self.sequencer.run(&mut self.regs, &self.response);
            self.stats.record_transfer(outcome);
            report.transfer = Some(outcome);
        }

        if self.status().has(StatusFlag::STOPF) {
            self.status().clear_stop_detected();
            self.stats.stops = self.stats.stops.saturating_add(1);
            report.stop = true;
        }

        report
    }

    /// Error interrupt handler
    ///
    /// Clears every raised error flag, counts it and re-enables ACK. AF
    /// after the last byte of a response is how a controller ends a read,
    /// so it is counted like any other NACK.
    pub fn on_error(&mut self) -> ErrorReport {
        let mut report = ErrorReport::default();
        let mut status = StatusView::new(&mut self.regs);

        for error in BusError::ALL {
            if status.has(error.flag()) {
                // Every BusError flag is rc_w0
                let _ = status.clear(error.flag());
                report.raised |= error.flag().mask();
                self.stats.record_error(error);
            }
        }

        self.regs.set_control1(cr1::ACK);
        report
    }

    /// Replace the payload answered to controller reads
    pub fn set_response(&mut self, payload: &[u8]) -> Result<(), ConfigError> {
        self.response = Vec::from_slice(payload).map_err(|_| ConfigError::ResponseTooLong)?;
        Ok(())
    }

    /// Payload currently answered to controller reads
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Address as configured
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Address the hardware matches in 7-bit mode
    pub fn effective_address(&self) -> u8 {
        self.address & 0x7F
    }

    pub fn retry_budget(&self) -> u32 {
        self.sequencer.retry_budget()
    }

    pub fn stats(&self) -> TargetStats {
        self.stats
    }

    /// Capture SR1/SR2 for a debug dump
    ///
    /// Acknowledges a pending address match, so call it outside a transfer.
    pub fn status_snapshot(&mut self) -> StatusSnapshot {
        self.status().snapshot()
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    fn status(&mut self) -> StatusView<'_, R> {
        StatusView::new(&mut self.regs)
    }
}

/// Main-loop side of the target: drains received bytes
pub struct TargetReader<'a, const N: usize> {
    rx: RxConsumer<'a, N>,
}

impl<'a, const N: usize> TargetReader<'a, N> {
    /// Bytes waiting to be read
    pub fn buffered(&self) -> usize {
        self.rx.used()
    }

    /// Drain up to `dest.len()` bytes, returning how many were copied
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        self.rx.read(dest)
    }

    /// Take one byte
    pub fn read_byte(&mut self) -> Result<u8, RxError> {
        self.rx.get().ok_or(RxError::BufferEmpty)
    }

    /// Bytes lost to a full buffer since start-up
    pub fn dropped(&self) -> usize {
        self.rx.dropped()
    }

    pub fn capacity(&self) -> usize {
        self.rx.capacity()
    }
}
