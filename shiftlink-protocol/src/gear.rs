//! Shifter state

use core::fmt;

use crate::report::ReportError;

/// Highest H-pattern gear; gear 8 is reverse, gear 0 is neutral
pub const MAX_H_GEAR: u8 = 8;

/// Shifter operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftMode {
    /// Paddle-style up/down
    Sequential,
    /// H-pattern gate
    H,
}

const MODE_SEQUENTIAL: u8 = 0x00;
const MODE_H: u8 = 0x80;

impl ShiftMode {
    pub const fn to_byte(self) -> u8 {
        match self {
            ShiftMode::Sequential => MODE_SEQUENTIAL,
            ShiftMode::H => MODE_H,
        }
    }

    /// Anything other than the H marker reads as sequential
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            MODE_H => ShiftMode::H,
            _ => ShiftMode::Sequential,
        }
    }

    /// One-letter tag used in log lines
    pub const fn tag(self) -> char {
        match self {
            ShiftMode::Sequential => 'S',
            ShiftMode::H => 'H',
        }
    }
}

/// Lever position in sequential mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequentialPosition {
    Center,
    Down,
    Up,
}

const SEQUENTIAL_CENTER: u8 = 0x04;
const SEQUENTIAL_DOWN: u8 = 0x05;
const SEQUENTIAL_UP: u8 = 0x06;

impl SequentialPosition {
    pub const fn to_byte(self) -> u8 {
        match self {
            SequentialPosition::Center => SEQUENTIAL_CENTER,
            SequentialPosition::Down => SEQUENTIAL_DOWN,
            SequentialPosition::Up => SEQUENTIAL_UP,
        }
    }

    /// Unknown values read as centre
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            SEQUENTIAL_DOWN => SequentialPosition::Down,
            SEQUENTIAL_UP => SequentialPosition::Up,
            _ => SequentialPosition::Center,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SequentialPosition::Center => "Center",
            SequentialPosition::Down => "Down",
            SequentialPosition::Up => "Up",
        }
    }
}

/// Everything a gear report carries
///
/// Both the H gear and the sequential position are kept regardless of the
/// active mode; the report always carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GearState {
    mode: ShiftMode,
    h_gear: u8,
    sequential: SequentialPosition,
    x: u8,
    y: u8,
}

impl Default for GearState {
    /// Power-on state of the shifter: H mode, neutral
    fn default() -> Self {
        Self {
            mode: ShiftMode::H,
            h_gear: 0,
            sequential: SequentialPosition::Down,
            x: 0,
            y: 0,
        }
    }
}

impl GearState {
    pub fn mode(&self) -> ShiftMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ShiftMode) {
        self.mode = mode;
    }

    pub fn h_gear(&self) -> u8 {
        self.h_gear
    }

    /// Select an H-pattern gear, 0 (neutral) to [`MAX_H_GEAR`] (reverse)
    pub fn set_h_gear(&mut self, gear: u8) -> Result<(), ReportError> {
        if gear > MAX_H_GEAR {
            return Err(ReportError::GearOutOfRange);
        }
        self.h_gear = gear;
        Ok(())
    }

    pub fn sequential(&self) -> SequentialPosition {
        self.sequential
    }

    pub fn set_sequential(&mut self, position: SequentialPosition) {
        self.sequential = position;
    }

    /// Raw stick coordinates as (x, y)
    pub fn stick(&self) -> (u8, u8) {
        (self.x, self.y)
    }

    pub fn set_stick(&mut self, x: u8, y: u8) {
        self.x = x;
        self.y = y;
    }

    /// Build a state directly, for decoding
    pub(crate) fn from_parts(
        mode: ShiftMode,
        h_gear: u8,
        sequential: SequentialPosition,
        x: u8,
        y: u8,
    ) -> Self {
        Self {
            mode,
            h_gear,
            sequential,
            x,
            y,
        }
    }
}

impl fmt::Display for GearState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ShiftMode::Sequential => write!(f, "S -> {}", self.sequential.name()),
            ShiftMode::H => write!(f, "H -> {}", self.h_gear),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GearState {
    fn format(&self, f: defmt::Formatter) {
        match self.mode {
            ShiftMode::Sequential => defmt::write!(f, "S -> {=str}", self.sequential.name()),
            ShiftMode::H => defmt::write!(f, "H -> {=u8}", self.h_gear),
        }
    }
}
