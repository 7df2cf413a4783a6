//! Shifter gear report protocol
//!
//! The shifter writes a fixed 14-byte report to the wheel base every time
//! its state changes. Only three bytes carry gear information; the rest are
//! constants or the raw stick coordinates.
//!
//! # Report layout
//! ```text
//! ┌──────┬──────┬──────┬───────┬───────┬──────┬──────┬───┬───┬─────────┐
//! │ MODE │ 0x0C │ 0x01 │ H-GEAR│ S-POS │ 0x80 │ 0x80 │ Y │ X │ 0 x 5   │
//! │ 0    │ 1    │ 2    │ 3     │ 4     │ 5    │ 6    │ 7 │ 8 │ 9..=13  │
//! └──────┴──────┴──────┴───────┴───────┴──────┴──────┴───┴───┴─────────┘
//! ```
//!
//! MODE is `0x00` for sequential and `0x80` for H-pattern. H-GEAR is a
//! one-hot byte, `0x80 >> (8 - gear)`, so neutral encodes as `0x00` and
//! reverse (gear 8) as `0x80`. S-POS is `0x04` centre, `0x05` down and
//! `0x06` up.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod demo;
pub mod gear;
pub mod report;

pub use command::Command;
pub use demo::{demo_sequence, DEMO_STEPS};
pub use gear::{GearState, SequentialPosition, ShiftMode, MAX_H_GEAR};
pub use report::{ReportError, REPORT_LEN};
