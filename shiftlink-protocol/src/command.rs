//! Single-character serial commands for the shifter

use crate::gear::{GearState, SequentialPosition, ShiftMode};

/// What a serial byte asks the shifter to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Send the current report (`' '`)
    Send,
    /// Switch mode (`s`, `h`)
    Mode(ShiftMode),
    /// Move the sequential lever (`u`, `d`, `c`)
    Sequential(SequentialPosition),
    /// Select an H gear (`0`..=`8`)
    HGear(u8),
}

impl Command {
    /// Map a serial byte to a command; unknown bytes are ignored
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b' ' => Some(Command::Send),
            b's' => Some(Command::Mode(ShiftMode::Sequential)),
            b'h' => Some(Command::Mode(ShiftMode::H)),
            b'u' => Some(Command::Sequential(SequentialPosition::Up)),
            b'd' => Some(Command::Sequential(SequentialPosition::Down)),
            b'c' => Some(Command::Sequential(SequentialPosition::Center)),
            b'0'..=b'8' => Some(Command::HGear(byte - b'0')),
            _ => None,
        }
    }
}

impl GearState {
    /// Apply a command, returning true when a report should be sent
    ///
    /// An out-of-range [`Command::HGear`] leaves the state unchanged.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Send => return true,
            Command::Mode(mode) => self.set_mode(mode),
            Command::Sequential(position) => self.set_sequential(position),
            Command::HGear(gear) => {
                let _ = self.set_h_gear(gear);
            }
        }
        false
    }
}
