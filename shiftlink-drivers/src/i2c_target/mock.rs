//! Mock register block for host tests
//!
//! Models the parts of the peripheral the driver depends on: the SR1/SR2
//! clear sequences, `rc_w0` error flags, a receive FIFO behind the data
//! register and a transmit pipeline that can be stalled or made to NACK.

use std::collections::VecDeque;
use std::vec::Vec;

use shiftlink_hal::i2c::{cr1, AddressSlot, I2cTargetRegs};
use shiftlink_hal::InterruptLine;

use super::status::StatusFlag;

/// Observable bus-side effects, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Byte loaded into the data register
    Data(u8),
    /// STOP requested through CR1
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastRead {
    None,
    Sr1(u16),
    Sr2,
}

#[derive(Debug, Clone)]
pub struct MockRegs {
    pub sr1: u16,
    pub sr2: u16,
    pub cr1: u16,
    pub cr2: u16,
    pub oar1: u16,
    pub oar2: u16,
    /// Bytes the controller will write, one per RXNE
    pub rx: VecDeque<u8>,
    pub events: Vec<BusEvent>,
    pub sr1_writes: Vec<u16>,
    pub sr1_reads: usize,
    /// Value of `sr1_reads` at each data register load
    pub write_reads: Vec<usize>,
    /// TXE follows the transmit pipeline (always ready when true)
    pub tx_ready: bool,
    /// Hold BTF low even when the pipeline is ready
    pub btf_stuck: bool,
    /// Raise AF once SR1 has been read this many times
    pub nack_after_reads: Option<usize>,
    /// After this many loads, hold BTF low and raise AF
    pub nack_after_writes: Option<usize>,
    last_read: LastRead,
}

impl MockRegs {
    pub fn new() -> Self {
        Self {
            sr1: 0,
            sr2: 0,
            cr1: 0,
            cr2: 0,
            oar1: 0,
            oar2: 0,
            rx: VecDeque::new(),
            events: Vec::new(),
            sr1_writes: Vec::new(),
            sr1_reads: 0,
            write_reads: Vec::new(),
            tx_ready: false,
            btf_stuck: false,
            nack_after_reads: None,
            nack_after_writes: None,
            last_read: LastRead::None,
        }
    }

    /// Peripheral addressed for reading: ADDR with TXE pending, bus busy, transmitter
    pub fn addressed_for_read() -> Self {
        let mut regs = Self::new();
        regs.sr1 = StatusFlag::ADDR.mask() | StatusFlag::TXE.mask();
        regs.sr2 = StatusFlag::BUSY.mask() | StatusFlag::TRA.mask();
        regs.tx_ready = true;
        regs
    }

    /// Peripheral receiving `bytes` from the controller
    pub fn receiving(bytes: &[u8]) -> Self {
        let mut regs = Self::new();
        regs.rx.extend(bytes.iter().copied());
        regs.sr1 = StatusFlag::RXNE.mask();
        regs.sr2 = StatusFlag::BUSY.mask();
        regs
    }

    /// Bytes loaded into the data register so far
    pub fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BusEvent::Data(byte) => Some(*byte),
                BusEvent::Stop => None,
            })
            .collect()
    }

    /// Number of STOP requests
    pub fn stops(&self) -> usize {
        self.events
            .iter()
            .filter(|event| **event == BusEvent::Stop)
            .count()
    }
}

impl I2cTargetRegs for MockRegs {
    fn read_status1(&mut self) -> u16 {
        self.sr1_reads += 1;
        if let Some(limit) = self.nack_after_reads {
            if self.sr1_reads >= limit {
                self.sr1 |= StatusFlag::AF.mask();
            }
        }

        let pipeline = StatusFlag::TXE.mask() | StatusFlag::BTF.mask();
        let mut value = self.sr1 & !pipeline;
        if self.tx_ready {
            value |= StatusFlag::TXE.mask();
            if !self.btf_stuck {
                value |= StatusFlag::BTF.mask();
            }
        } else {
            value |= self.sr1 & pipeline;
        }

        self.last_read = LastRead::Sr1(value);
        value
    }

    fn read_status2(&mut self) -> u16 {
        if let LastRead::Sr1(sr1) = self.last_read {
            if sr1 & StatusFlag::ADDR.mask() != 0 {
                self.sr1 &= !StatusFlag::ADDR.mask();
            }
        }
        self.last_read = LastRead::Sr2;
        self.sr2
    }

    fn write_status1(&mut self, value: u16) {
        const RC_W0: u16 = 0xDF00;
        self.sr1_writes.push(value);
        self.sr1 &= value | !RC_W0;
        self.last_read = LastRead::None;
    }

    fn read_data(&mut self) -> u8 {
        let byte = self.rx.pop_front().unwrap_or(0);
        if self.rx.is_empty() {
            self.sr1 &= !StatusFlag::RXNE.mask();
        }
        self.last_read = LastRead::None;
        byte
    }

    fn write_data(&mut self, byte: u8) {
        self.events.push(BusEvent::Data(byte));
        self.write_reads.push(self.sr1_reads);
        if self.nack_after_writes == Some(self.write_reads.len()) {
            self.btf_stuck = true;
            self.sr1 |= StatusFlag::AF.mask();
        }
        self.last_read = LastRead::None;
    }

    fn modify_control1(&mut self, set: u16, clear: u16) {
        if let LastRead::Sr1(sr1) = self.last_read {
            if sr1 & StatusFlag::STOPF.mask() != 0 {
                self.sr1 &= !StatusFlag::STOPF.mask();
            }
        }
        if set & cr1::STOP != 0 {
            self.events.push(BusEvent::Stop);
        }
        self.cr1 = (self.cr1 | set) & !clear;
        self.last_read = LastRead::None;
    }

    fn modify_control2(&mut self, set: u16, clear: u16) {
        self.cr2 = (self.cr2 | set) & !clear;
    }

    fn write_own_address(&mut self, slot: AddressSlot, value: u16) {
        match slot {
            AddressSlot::Primary => self.oar1 = value,
            AddressSlot::Dual => self.oar2 = value,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockLine {
    pub priority: Option<u8>,
    pub enabled: bool,
}

impl InterruptLine for MockLine {
    fn set_priority(&mut self, priority: u8) {
        self.priority = Some(priority);
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}
