//! Exercise-all-gears sequence
//!
//! Sequential centre, down, up, then every H gear from neutral to reverse.
//! The shifter firmware plays it one step per second when built with the
//! `demo` feature.

use crate::gear::{GearState, SequentialPosition, ShiftMode, MAX_H_GEAR};

const POSITIONS: [SequentialPosition; 3] = [
    SequentialPosition::Center,
    SequentialPosition::Down,
    SequentialPosition::Up,
];

/// Number of states in one demo pass
pub const DEMO_STEPS: usize = POSITIONS.len() + MAX_H_GEAR as usize + 1;

fn step(index: usize) -> GearState {
    let mut state = GearState::default();
    match POSITIONS.get(index) {
        Some(&position) => {
            state.set_mode(ShiftMode::Sequential);
            state.set_sequential(position);
        }
        None => {
            // the lever stays where the sequential part left it
            state.set_mode(ShiftMode::H);
            state.set_sequential(SequentialPosition::Up);
            let _ = state.set_h_gear((index - POSITIONS.len()) as u8);
        }
    }
    state
}

/// One full pass of the demo
pub fn demo_sequence() -> [GearState; DEMO_STEPS] {
    core::array::from_fn(step)
}
