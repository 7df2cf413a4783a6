//! 14-byte gear report encoding and decoding

use crate::gear::{GearState, SequentialPosition, ShiftMode, MAX_H_GEAR};

/// Length of one gear report
pub const REPORT_LEN: usize = 14;

const MODE: usize = 0;
const H_GEAR: usize = 3;
const SEQUENTIAL: usize = 4;
const Y: usize = 7;
const X: usize = 8;

/// Bytes that never change between reports
const TEMPLATE: [u8; REPORT_LEN] = [
    0x00, 0x0C, 0x01, 0x00, 0x00, 0x80, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Gear report errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Fewer than [`REPORT_LEN`] bytes supplied
    TooShort,
    /// H gear above [`MAX_H_GEAR`]
    GearOutOfRange,
}

/// One-hot H gear byte; neutral shifts the marker out entirely
fn h_gear_byte(gear: u8) -> u8 {
    0x80u8
        .checked_shr(u32::from(MAX_H_GEAR.saturating_sub(gear)))
        .unwrap_or(0)
}

/// Unknown patterns read as neutral
fn h_gear_from_byte(byte: u8) -> u8 {
    (0..=MAX_H_GEAR)
        .find(|&gear| h_gear_byte(gear) == byte)
        .unwrap_or(0)
}

impl GearState {
    /// Serialize into a report
    pub fn encode(&self) -> [u8; REPORT_LEN] {
        let mut report = TEMPLATE;
        let (x, y) = self.stick();
        report[MODE] = self.mode().to_byte();
        report[H_GEAR] = h_gear_byte(self.h_gear());
        report[SEQUENTIAL] = self.sequential().to_byte();
        report[Y] = y;
        report[X] = x;
        report
    }

    /// Parse a report
    ///
    /// Only the first [`REPORT_LEN`] bytes are looked at. The constant bytes
    /// are not checked.
    pub fn decode(data: &[u8]) -> Result<Self, ReportError> {
        if data.len() < REPORT_LEN {
            return Err(ReportError::TooShort);
        }

        Ok(GearState::from_parts(
            ShiftMode::from_byte(data[MODE]),
            h_gear_from_byte(data[H_GEAR]),
            SequentialPosition::from_byte(data[SEQUENTIAL]),
            data[X],
            data[Y],
        ))
    }
}
