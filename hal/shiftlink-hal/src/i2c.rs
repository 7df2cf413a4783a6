//! I2C target register abstraction
//!
//! The driver talks to the peripheral only through [`I2cTargetRegs`]. The
//! trait mirrors the register file of the ST-style I2C block (two status
//! registers, one data register, two control registers, two own-address
//! registers) without tying the driver to a PAC.
//!
//! Status reads take `&mut self`: on this peripheral family reading SR1 and
//! then SR2 clears the address-match flag, and reading SR1 then writing CR1
//! clears the stop-detected flag. Those are side effects, not queries.

/// CR1 bit masks
pub mod cr1 {
    /// Peripheral enable
    pub const PE: u16 = 1 << 0;
    /// Start generation
    pub const START: u16 = 1 << 8;
    /// Stop generation (target mode: release SCL/SDA after the current byte)
    pub const STOP: u16 = 1 << 9;
    /// Acknowledge enable
    pub const ACK: u16 = 1 << 10;
    /// Acknowledge/PEC position
    pub const POS: u16 = 1 << 11;
    /// Software reset
    pub const SWRST: u16 = 1 << 15;
}

/// CR2 bit masks
pub mod cr2 {
    /// Error interrupt enable
    pub const ITERREN: u16 = 1 << 8;
    /// Event interrupt enable
    pub const ITEVTEN: u16 = 1 << 9;
    /// Buffer interrupt enable (TxE / RxNE raise event interrupts)
    pub const ITBUFEN: u16 = 1 << 10;
}

/// Which own-address register to program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressSlot {
    /// OAR1, the primary address
    Primary,
    /// OAR2, the dual address
    Dual,
}

/// Register access for an I2C peripheral operated as a bus target
pub trait I2cTargetRegs {
    /// Read status register 1 (event and error flags)
    fn read_status1(&mut self) -> u16;

    /// Read status register 2 (bus state flags)
    fn read_status2(&mut self) -> u16;

    /// Write status register 1
    ///
    /// Error flags in SR1 are `rc_w0`: writing 0 clears them and writing 1
    /// leaves them unchanged.
    fn write_status1(&mut self, value: u16);

    /// Read the received byte from the data register
    fn read_data(&mut self) -> u8;

    /// Load the next byte to transmit into the data register
    fn write_data(&mut self, byte: u8);

    /// Read-modify-write CR1: set the bits in `set`, then clear the bits in `clear`
    fn modify_control1(&mut self, set: u16, clear: u16);

    /// Read-modify-write CR2: set the bits in `set`, then clear the bits in `clear`
    fn modify_control2(&mut self, set: u16, clear: u16);

    /// Write an own-address register
    fn write_own_address(&mut self, slot: AddressSlot, value: u16);

    /// Set bits in CR1
    fn set_control1(&mut self, bits: u16) {
        self.modify_control1(bits, 0);
    }

    /// Clear bits in CR1
    fn clear_control1(&mut self, bits: u16) {
        self.modify_control1(0, bits);
    }
}
