//! Monochrome 640x480 VGA output for the RP2040, generated entirely by PIO
//! and DMA.
//!
//! # Basic usage
//!
//! Bring the PIO blocks, DMA and IO_BANK0 out of reset and set the system
//! clock to 125 MHz (a HAL is convenient for this). Then:
//!
//! ```ignore
//! static mut FRAME: FrameStorage = FrameStorage::new();
//!
//! let hw = Hardware::take().unwrap();
//! let storage = unsafe { &mut *core::ptr::addr_of_mut!(FRAME) };
//! let mut vga = VgaDriver::new(hw, storage, VgaConfig::default());
//! let mut fb = vga.start()?;
//! fb.rect(10, 10, 100, 50, true, true);
//! ```
//!
//! From here on the display refreshes by itself at about 60 Hz. The CPU never
//! needs to look at it again, except to draw.
//!
//! # How it works
//!
//! Three PIO state machines in one block each own a pin. HSYNC counts out
//! each 800-pixel line and flags the start of the next on a PIO IRQ; VSYNC
//! counts those flags to place the vertical sync pulse, and passes on the
//! ones that start visible lines; COLOR shifts out a line of pixels on each
//! of those. Two DMA channels keep COLOR's FIFO full, restarting each other at
//! the end of every frame. See the `program` and `driver::dma_chain` modules
//! for the details.
//!
//! On the host, `sim` provides register blocks backed by plain memory, so the
//! driver (and code using it) can be exercised without hardware.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod driver;
pub mod error;
pub mod framebuffer;
pub mod hw;
pub mod program;
pub mod timing;

#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use crate::config::{AllocationPolicy, VgaConfig};
pub use crate::driver::{DriverState, Session, VgaDriver};
pub use crate::error::{ConfigError, Error, Resource};
pub use crate::framebuffer::{FrameBuffer, FrameStorage, FRAME_BYTES, HEIGHT, WIDTH};
pub use crate::hw::{Hardware, PioBlock};
pub use gfx::{Bitmap, Point, PointList};
