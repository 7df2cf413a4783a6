//! Transmit sequencer
//!
//! Pushes the response payload out byte by byte once the controller has
//! addressed us for reading. Runs inside the event interrupt and polls the
//! status registers with a bounded retry budget.
//!
//! The budget is an iteration count, not a wall-clock timeout; how long it
//! lasts depends on the core clock.

use shiftlink_hal::i2c::{cr1, I2cTargetRegs};

use super::status::{StatusFlag, StatusView};

/// Default number of status polls per wait
pub const DEFAULT_RETRY_BUDGET: u32 = 10_000;

/// Why a response transfer ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// The controller answered a byte with NACK or stopped the transfer
    Nack,
    /// TXE or BTF never asserted within the retry budget
    Timeout,
}

/// Result of one response transfer
pub type TransferOutcome = Result<(), TransmitError>;

/// How a single wait ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitError {
    Nack,
    Stopped,
    Exhausted,
}

impl From<WaitError> for TransmitError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Nack | WaitError::Stopped => TransmitError::Nack,
            WaitError::Exhausted => TransmitError::Timeout,
        }
    }
}

/// Byte-at-a-time transmit handshake with a bounded retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitSequencer {
    retry_budget: u32,
}

impl Default for TransmitSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

impl TransmitSequencer {
    /// Create a sequencer polling at most `retry_budget` times per wait
    pub const fn new(retry_budget: u32) -> Self {
        Self { retry_budget }
    }

    /// Polls allowed per wait
    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Send `payload` to the controller
    ///
    /// Disables POS, acknowledges the address match, then loads each byte
    /// once TXE is set. When BTF is already set after a load, the next byte
    /// goes in on the same pass so both stages of the shift pipeline stay
    /// full. A STOP request follows the last byte.
    ///
    /// A controller ends every read by NACKing the last byte, so AF while
    /// waiting for the final BTF completes the transfer.
    ///
    /// On failure the STOP request has been issued and the AF or STOPF flag
    /// cleared, so the bus is never left held.
    pub fn run<R: I2cTargetRegs>(&self, regs: &mut R, payload: &[u8]) -> TransferOutcome {
        regs.clear_control1(cr1::POS);
        StatusView::new(regs).clear_address_match();

        let mut pos = 0;
        while pos < payload.len() {
            self.wait_for(regs, StatusFlag::TXE)?;

            regs.write_data(payload[pos]);
            pos += 1;

            if pos < payload.len() && StatusView::new(regs).has(StatusFlag::BTF) {
                regs.write_data(payload[pos]);
                pos += 1;
            }

            match self.wait_for(regs, StatusFlag::BTF) {
                // AF is cleared and STOP already requested
                Err(WaitError::Nack) if pos == payload.len() => return Ok(()),
                other => other?,
            }
        }

        regs.set_control1(cr1::STOP);
        Ok(())
    }

    /// Poll until `flag` is set, the controller NACKs or stops, or the budget runs out
    fn wait_for<R: I2cTargetRegs>(
        &self,
        regs: &mut R,
        flag: StatusFlag,
    ) -> Result<(), WaitError> {
        let mut status = StatusView::new(regs);

        for _ in 0..self.retry_budget {
            if status.has(flag) {
                return Ok(());
            }

            if status.has(StatusFlag::AF) {
                // AF is rc_w0, clearing cannot fail
                let _ = status.clear(StatusFlag::AF);
                regs.set_control1(cr1::STOP);
                return Err(WaitError::Nack);
            }

            if status.has(StatusFlag::STOPF) {
                status.clear_stop_detected();
                regs.set_control1(cr1::STOP);
                return Err(WaitError::Stopped);
            }
        }

        regs.set_control1(cr1::STOP);
        Err(WaitError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c_target::mock::{BusEvent, MockRegs};

    const RESPONSE: [u8; 5] = [0xDE, 0xED, 0xBE, 0xEF, 0x00];

    #[test]
    fn test_sends_payload_then_stop() {
        let mut regs = MockRegs::addressed_for_read();
        regs.cr1 = cr1::ACK | cr1::POS;

        let outcome = TransmitSequencer::default().run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Ok(()));
        assert_eq!(
            regs.events,
            [
                BusEvent::Data(0xDE),
                BusEvent::Data(0xED),
                BusEvent::Data(0xBE),
                BusEvent::Data(0xEF),
                BusEvent::Data(0x00),
                BusEvent::Stop,
            ]
        );
        // POS off, address match acknowledged
        assert_eq!(regs.cr1 & cr1::POS, 0);
        assert_eq!(regs.sr1 & StatusFlag::ADDR.mask(), 0);
    }

    #[test]
    fn test_second_byte_loaded_while_btf_set() {
        let mut regs = MockRegs::addressed_for_read();

        let outcome = TransmitSequencer::default().run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Ok(()));
        // SR1 reads at each load: one TXE poll per pass, and the second
        // byte of a pass follows straight after the BTF check
        assert_eq!(regs.write_reads, [2, 3, 5, 6, 8]);
    }

    #[test]
    fn test_odd_payload_stops_at_its_end() {
        let mut regs = MockRegs::addressed_for_read();

        let outcome = TransmitSequencer::default().run(&mut regs, &[0x11, 0x22, 0x33]);

        assert_eq!(outcome, Ok(()));
        assert_eq!(
            regs.events,
            [
                BusEvent::Data(0x11),
                BusEvent::Data(0x22),
                BusEvent::Data(0x33),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_final_nack_completes_read() {
        let mut regs = MockRegs::addressed_for_read();
        regs.nack_after_writes = Some(RESPONSE.len());

        let outcome = TransmitSequencer::default().run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Ok(()));
        assert_eq!(regs.written(), RESPONSE);
        assert_eq!(regs.stops(), 1);
        assert_eq!(regs.sr1 & StatusFlag::AF.mask(), 0);
    }

    #[test]
    fn test_nack_with_bytes_left() {
        let mut regs = MockRegs::addressed_for_read();
        regs.nack_after_writes = Some(2);

        let outcome = TransmitSequencer::default().run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Err(TransmitError::Nack));
        assert_eq!(regs.written(), [0xDE, 0xED]);
        assert_eq!(regs.stops(), 1);
        assert_eq!(regs.sr1 & StatusFlag::AF.mask(), 0);
    }

    #[test]
    fn test_one_byte_per_pass_without_btf() {
        let mut regs = MockRegs::addressed_for_read();
        regs.btf_stuck = true;

        // With BTF held low the first wait for it times out after one byte
        let outcome = TransmitSequencer::new(50).run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Err(TransmitError::Timeout));
        assert_eq!(regs.events, [BusEvent::Data(0xDE), BusEvent::Stop]);
    }

    #[test]
    fn test_nack_during_txe_wait() {
        let mut regs = MockRegs::new();
        regs.sr2 = StatusFlag::BUSY.mask() | StatusFlag::TRA.mask();
        regs.nack_after_reads = Some(40);

        let outcome = TransmitSequencer::new(100).run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Err(TransmitError::Nack));
        assert!(regs.written().is_empty());
        assert_eq!(regs.stops(), 1);
        assert_eq!(regs.sr1 & StatusFlag::AF.mask(), 0);
    }

    #[test]
    fn test_txe_timeout_without_nack() {
        let mut regs = MockRegs::new();

        let outcome = TransmitSequencer::new(25).run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Err(TransmitError::Timeout));
        assert!(regs.written().is_empty());
        assert_eq!(regs.stops(), 1);
        // clear_address_match (1 read) + 25 polls x 3 reads
        assert_eq!(regs.sr1_reads, 1 + 25 * 3);
    }

    #[test]
    fn test_stop_during_wait() {
        let mut regs = MockRegs::new();
        regs.sr1 = StatusFlag::STOPF.mask();

        let outcome = TransmitSequencer::new(100).run(&mut regs, &RESPONSE);

        assert_eq!(outcome, Err(TransmitError::Nack));
        assert_eq!(regs.sr1 & StatusFlag::STOPF.mask(), 0);
        assert_eq!(regs.stops(), 1);
    }

    #[test]
    fn test_empty_payload_only_stops() {
        let mut regs = MockRegs::addressed_for_read();

        let outcome = TransmitSequencer::default().run(&mut regs, &[]);

        assert_eq!(outcome, Ok(()));
        assert_eq!(regs.events, [BusEvent::Stop]);
    }
}
