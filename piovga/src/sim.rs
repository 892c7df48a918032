//! Memory-backed stand-ins for the peripheral register blocks.
//!
//! The driver can't tell these apart from the real thing; registers simply
//! hold whatever was last written. That's enough to run the driver on a host
//! and inspect exactly what it would have programmed. The helpers here poke
//! the state another user of the hardware would leave behind.

use crate::hw::dma::CtrlWord;
use crate::hw::pio::ctrl;
use crate::hw::{DmaRegisters, Hardware, IoBank0Registers, PioBlock, PioRegisters};

pub struct SimulatedHardware {
    pio: [Box<PioRegisters>; 2],
    dma: Box<DmaRegisters>,
    io_bank0: Box<IoBank0Registers>,
}

/// Allocates a register block with every register reading zero, as after
/// reset.
fn zeroed<T>() -> Box<T> {
    // Safety: register blocks are plain arrays of `u32` cells, for which all
    // zeroes is a valid value.
    Box::new(unsafe { core::mem::zeroed() })
}

impl SimulatedHardware {
    pub fn new() -> Self {
        SimulatedHardware {
            pio: [zeroed(), zeroed()],
            dma: zeroed(),
            io_bank0: zeroed(),
        }
    }

    /// Hands out the register blocks, as `Hardware::take` would on the chip.
    pub fn hardware(&self) -> Hardware<'_> {
        Hardware {
            pio: [&self.pio[0], &self.pio[1]],
            dma: &self.dma,
            io_bank0: &self.io_bank0,
        }
    }

    pub fn pio(&self, block: PioBlock) -> &PioRegisters {
        &self.pio[block.index()]
    }

    pub fn dma(&self) -> &DmaRegisters {
        &self.dma
    }

    pub fn io_bank0(&self) -> &IoBank0Registers {
        &self.io_bank0
    }

    /// Marks state machine `sm` of `block` as running someone else's
    /// program.
    pub fn occupy(&self, block: PioBlock, sm: u8) {
        unsafe {
            self.pio(block)
                .ctrl
                .modify(|v| v | ctrl::sm_enable(1 << sm))
        }
    }

    /// Makes DMA channel `n` report a transfer in progress.
    pub fn mark_busy(&self, n: usize) {
        unsafe { self.dma.ch[n].ctrl_trig.modify(|v| v | CtrlWord::BUSY) }
    }

    pub fn clear_busy(&self, n: usize) {
        unsafe { self.dma.ch[n].ctrl_trig.modify(|v| v & !CtrlWord::BUSY) }
    }

    /// Sets DMA channel `n`'s read error flag.
    pub fn inject_bus_error(&self, n: usize) {
        unsafe {
            self.dma.ch[n]
                .ctrl_trig
                .modify(|v| v | CtrlWord::READ_ERROR | CtrlWord::AHB_ERROR)
        }
    }
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new()
    }
}
