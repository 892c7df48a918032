//! Driver state bookkeeping.

use core::fmt;

use super::allocator::{slot_mask, StateMachineBinding};
use super::dma_chain::DmaChain;
use crate::hw::PioBlock;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DriverState {
    Idle,
    Active,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DriverState::Idle => "idle",
            DriverState::Active => "active",
        })
    }
}

/// Everything a running driver has claimed. Exists exactly while the driver
/// is active; tearing it down releases all of it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub block: PioBlock,
    /// HSYNC, VSYNC and COLOR, in that order.
    pub bindings: [StateMachineBinding; 3],
    pub chain: DmaChain,
}

impl Session {
    pub fn slot_mask(&self) -> u8 {
        slot_mask(&self.bindings)
    }
}
