//! Register-level access to the peripherals the driver uses.
//!
//! Each peripheral is described by a `#[repr(C)]` struct of volatile cells
//! overlaying its register window. On the target these are placed at their
//! fixed physical addresses; on the host the same structs are backed by
//! ordinary memory (see `sim`), which is what lets the driver be tested
//! without a chip attached.

pub mod dma;
pub mod io_bank0;
pub mod pio;

use core::fmt;

pub use self::dma::{CtrlWord, DataSize, DmaRegisters};
pub use self::io_bank0::IoBank0Registers;
pub use self::pio::PioRegisters;

/// Number of PIO blocks on the chip.
pub const PIO_BLOCKS: usize = 2;

/// Identifies one of the PIO blocks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PioBlock {
    Pio0,
    Pio1,
}

impl PioBlock {
    /// All blocks, in scan order.
    pub const ALL: [PioBlock; PIO_BLOCKS] = [PioBlock::Pio0, PioBlock::Pio1];

    pub fn index(self) -> usize {
        match self {
            PioBlock::Pio0 => 0,
            PioBlock::Pio1 => 1,
        }
    }

    /// DMA request signal raised while state machine `sm`'s TX FIFO has room.
    pub fn tx_dreq(self, sm: usize) -> u8 {
        (self.index() * 8 + sm) as u8
    }

    /// GPIO FUNCSEL value that hands a pin to this block.
    pub fn gpio_function(self) -> u8 {
        match self {
            PioBlock::Pio0 => io_bank0::funcsel::PIO0,
            PioBlock::Pio1 => io_bank0::funcsel::PIO1,
        }
    }
}

impl fmt::Display for PioBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PIO{}", self.index())
    }
}

/// The peripherals the driver needs, borrowed for `'a`.
///
/// Holding a `Hardware` is what entitles code to write these registers.
pub struct Hardware<'a> {
    pub pio: [&'a PioRegisters; PIO_BLOCKS],
    pub dma: &'a DmaRegisters,
    pub io_bank0: &'a IoBank0Registers,
}

impl<'a> Hardware<'a> {
    pub fn pio(&self, block: PioBlock) -> &'a PioRegisters {
        self.pio[block.index()]
    }
}

/// Bus address of a register or buffer, as the DMA engine sees it.
pub fn bus_address<T: ?Sized>(r: &T) -> u32 {
    r as *const T as *const u8 as usize as u32
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        use core::sync::atomic::{AtomicBool, Ordering};

        /// Records whether `Hardware::take` has been called.
        static TAKEN: AtomicBool = AtomicBool::new(false);

        impl Hardware<'static> {
            /// Claims the peripherals. Returns `Some` exactly once.
            ///
            /// The caller is still responsible for bringing the blocks out of
            /// reset, and for not handing the same blocks to a HAL.
            pub fn take() -> Option<Self> {
                // No compare-and-swap on M0+, so use a critical section.
                cortex_m::interrupt::free(|_| {
                    if TAKEN.load(Ordering::Relaxed) {
                        None
                    } else {
                        TAKEN.store(true, Ordering::Relaxed);
                        Some(unsafe { Self::steal() })
                    }
                })
            }

            /// Produces the peripherals without checking whether they've
            /// already been handed out.
            ///
            /// # Safety
            ///
            /// Two live `Hardware` values can program the same registers out
            /// from under each other.
            pub unsafe fn steal() -> Self {
                Hardware {
                    pio: [
                        &*(pio::PIO0_BASE as *const PioRegisters),
                        &*(pio::PIO1_BASE as *const PioRegisters),
                    ],
                    dma: &*(dma::DMA_BASE as *const DmaRegisters),
                    io_bank0: &*(io_bank0::IO_BANK0_BASE as *const IoBank0Registers),
                }
            }
        }
    }
}
