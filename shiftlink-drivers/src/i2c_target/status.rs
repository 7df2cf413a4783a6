//! Status register view
//!
//! The peripheral multiplexes its event and error conditions over two
//! status registers. A [`StatusFlag`] packs the register selector and the
//! bit mask into one value, so every condition is queried the same way.
//!
//! Reads are not free of side effects on this peripheral family:
//!
//! - SR1 read followed by SR2 read clears ADDR (address matched)
//! - SR1 read followed by a CR1 write clears STOPF (stop detected)
//! - error flags in SR1 are `rc_w0` and are cleared by writing 0
//!
//! [`StatusView`] therefore borrows the registers mutably.

use core::fmt;

use shiftlink_hal::i2c::{cr1, I2cTargetRegs};

/// Selector value for status register 1
const SR1_SELECT: u32 = 0x0001_0000;
/// Selector value for status register 2
const SR2_SELECT: u32 = 0x0010_0000;
/// Bit mask part of a flag identifier
const MASK: u32 = 0x0000_FFFF;

/// SR1 bits that software clears by writing 0
const SR1_RC_W0: u16 = 0xDF00;

/// The status register a flag lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusRegister {
    /// SR1: events and errors
    Sr1,
    /// SR2: bus state
    Sr2,
}

/// Identifier of one status condition
///
/// Bits 16..=23 select the register, bits 0..=15 hold the mask. Only the
/// constants below exist, so every flag maps to exactly one register and a
/// single bit in it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StatusFlag(u32);

impl StatusFlag {
    /// Start bit generated (controller mode)
    pub const SB: Self = Self(SR1_SELECT | 0x0001);
    /// Address sent (controller) / address matched (target)
    pub const ADDR: Self = Self(SR1_SELECT | 0x0002);
    /// Byte transfer finished
    pub const BTF: Self = Self(SR1_SELECT | 0x0004);
    /// 10-bit header sent
    pub const ADD10: Self = Self(SR1_SELECT | 0x0008);
    /// Stop detected (target mode)
    pub const STOPF: Self = Self(SR1_SELECT | 0x0010);
    /// Data register not empty (receive)
    pub const RXNE: Self = Self(SR1_SELECT | 0x0040);
    /// Data register empty (transmit)
    pub const TXE: Self = Self(SR1_SELECT | 0x0080);
    /// Bus error
    pub const BERR: Self = Self(SR1_SELECT | 0x0100);
    /// Arbitration lost
    pub const ARLO: Self = Self(SR1_SELECT | 0x0200);
    /// Acknowledge failure
    pub const AF: Self = Self(SR1_SELECT | 0x0400);
    /// Overrun/underrun
    pub const OVR: Self = Self(SR1_SELECT | 0x0800);
    /// PEC error in reception
    pub const PECERR: Self = Self(SR1_SELECT | 0x1000);
    /// SMBus timeout
    pub const TIMEOUT: Self = Self(SR1_SELECT | 0x4000);
    /// SMBus alert
    pub const SMBALERT: Self = Self(SR1_SELECT | 0x8000);

    /// Controller mode
    pub const MSL: Self = Self(SR2_SELECT | 0x0001);
    /// Bus busy
    pub const BUSY: Self = Self(SR2_SELECT | 0x0002);
    /// Transmitter (data bytes are sent, not received)
    pub const TRA: Self = Self(SR2_SELECT | 0x0004);
    /// General call address received
    pub const GENCALL: Self = Self(SR2_SELECT | 0x0010);
    /// SMBus device default address received
    pub const SMBDEFAULT: Self = Self(SR2_SELECT | 0x0020);
    /// SMBus host header received
    pub const SMBHOST: Self = Self(SR2_SELECT | 0x0040);
    /// Dual address matched (OAR2)
    pub const DUALF: Self = Self(SR2_SELECT | 0x0080);

    /// Every defined flag, SR1 first, in bit order
    pub const ALL: [StatusFlag; 21] = [
        Self::SB,
        Self::ADDR,
        Self::BTF,
        Self::ADD10,
        Self::STOPF,
        Self::RXNE,
        Self::TXE,
        Self::BERR,
        Self::ARLO,
        Self::AF,
        Self::OVR,
        Self::PECERR,
        Self::TIMEOUT,
        Self::SMBALERT,
        Self::MSL,
        Self::BUSY,
        Self::TRA,
        Self::GENCALL,
        Self::SMBDEFAULT,
        Self::SMBHOST,
        Self::DUALF,
    ];

    /// Register this flag is read from
    pub const fn register(self) -> StatusRegister {
        if self.0 & SR1_SELECT != 0 {
            StatusRegister::Sr1
        } else {
            StatusRegister::Sr2
        }
    }

    /// Bit mask inside the register
    pub const fn mask(self) -> u16 {
        (self.0 & MASK) as u16
    }

    /// Packed identifier (selector and mask)
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether software may clear this flag by writing its complement
    ///
    /// Only the SR1 error flags qualify. Event flags (ADDR, STOPF, TXE, ...)
    /// and everything in SR2 are managed by the hardware.
    pub const fn is_software_clearable(self) -> bool {
        matches!(self.register(), StatusRegister::Sr1) && self.mask() & SR1_RC_W0 != 0
    }

    /// Reference-manual name of the flag
    pub fn name(self) -> &'static str {
        FLAG_NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, name)| *name)
            .unwrap_or("?")
    }
}

impl fmt::Debug for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlag {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.name())
    }
}

/// Flag-to-name table for the debug dump
static FLAG_NAMES: [(StatusFlag, &str); 21] = [
    (StatusFlag::SB, "SB"),
    (StatusFlag::ADDR, "ADDR"),
    (StatusFlag::BTF, "BTF"),
    (StatusFlag::ADD10, "ADD10"),
    (StatusFlag::STOPF, "STOPF"),
    (StatusFlag::RXNE, "RxNE"),
    (StatusFlag::TXE, "TxE"),
    (StatusFlag::BERR, "BERR"),
    (StatusFlag::ARLO, "ARLO"),
    (StatusFlag::AF, "AF"),
    (StatusFlag::OVR, "OVR"),
    (StatusFlag::PECERR, "PECERR"),
    (StatusFlag::TIMEOUT, "TIMEOUT"),
    (StatusFlag::SMBALERT, "SMBALERT"),
    (StatusFlag::MSL, "MSL"),
    (StatusFlag::BUSY, "BUSY"),
    (StatusFlag::TRA, "TRA"),
    (StatusFlag::GENCALL, "GENCALL"),
    (StatusFlag::SMBDEFAULT, "SMBDEFAULT"),
    (StatusFlag::SMBHOST, "SMBHOST"),
    (StatusFlag::DUALF, "DUALF"),
];

/// Errors from status flag manipulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusError {
    /// The flag is set and cleared by the hardware only
    HardwareManaged(StatusFlag),
}

/// Raw SR1/SR2 values captured at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Status register 1
    pub sr1: u16,
    /// Status register 2
    pub sr2: u16,
}

impl StatusSnapshot {
    /// Test a flag against the captured values
    pub fn has(&self, flag: StatusFlag) -> bool {
        let value = match flag.register() {
            StatusRegister::Sr1 => self.sr1,
            StatusRegister::Sr2 => self.sr2,
        };
        value & flag.mask() != 0
    }

    /// Flags asserted in this snapshot
    pub fn active(&self) -> impl Iterator<Item = StatusFlag> + '_ {
        StatusFlag::ALL.into_iter().filter(move |flag| self.has(*flag))
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[SR1]")?;
        for flag in StatusFlag::ALL
            .iter()
            .filter(|flag| flag.register() == StatusRegister::Sr1)
        {
            write!(f, " | {} {}", flag.name(), u8::from(self.has(*flag)))?;
        }
        f.write_str("\r\n[SR2]")?;
        for flag in StatusFlag::ALL
            .iter()
            .filter(|flag| flag.register() == StatusRegister::Sr2)
        {
            write!(f, " | {} {}", flag.name(), u8::from(self.has(*flag)))?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusSnapshot {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SR1={=u16:#06x} SR2={=u16:#06x} [", self.sr1, self.sr2);
        for flag in self.active() {
            defmt::write!(f, " {=str}", flag.name());
        }
        defmt::write!(f, " ]");
    }
}

/// Condition queries over the two status registers
pub struct StatusView<'r, R> {
    regs: &'r mut R,
}

impl<'r, R: I2cTargetRegs> StatusView<'r, R> {
    /// Create a view over the peripheral's registers
    pub fn new(regs: &'r mut R) -> Self {
        Self { regs }
    }

    /// Read the flag's register and test its bit
    pub fn has(&mut self, flag: StatusFlag) -> bool {
        let value = match flag.register() {
            StatusRegister::Sr1 => self.regs.read_status1(),
            StatusRegister::Sr2 => self.regs.read_status2(),
        };
        value & flag.mask() != 0
    }

    /// Acknowledge an address match
    ///
    /// Reads SR1 then SR2 and discards both values. Must run once per
    /// address-match event before the first data byte is loaded.
    pub fn clear_address_match(&mut self) {
        let _ = self.regs.read_status1();
        let _ = self.regs.read_status2();
    }

    /// Acknowledge a stop condition
    ///
    /// Reads SR1 then writes CR1, releasing any pending stop request.
    pub fn clear_stop_detected(&mut self) {
        let _ = self.regs.read_status1();
        self.regs.clear_control1(cr1::STOP);
    }

    /// Clear a software-clearable flag by writing the complement of its mask
    pub fn clear(&mut self, flag: StatusFlag) -> Result<(), StatusError> {
        if !flag.is_software_clearable() {
            return Err(StatusError::HardwareManaged(flag));
        }
        self.regs.write_status1(!flag.mask());
        Ok(())
    }

    /// Capture both registers
    ///
    /// Reads SR1 then SR2, so a pending address match is acknowledged as a
    /// side effect.
    pub fn snapshot(&mut self) -> StatusSnapshot {
        let sr1 = self.regs.read_status1();
        let sr2 = self.regs.read_status2();
        StatusSnapshot { sr1, sr2 }
    }
}
