//! The driver lifecycle.
//!
//! A `VgaDriver` is either idle, holding nothing but borrowed register blocks
//! and frame storage, or active, with a `Session` recording the PIO block,
//! state machines, pins and DMA channels it's using. `start` and `stop` move
//! between the two and are all-or-nothing: if `start` fails partway,
//! everything it claimed is released before the error comes back.

pub mod allocator;
pub mod dma_chain;
mod session;

pub use self::allocator::StateMachineBinding;
pub use self::dma_chain::{DmaChain, DmaChannelConfig};
pub use self::session::{DriverState, Session};

use core::sync::atomic::{fence, Ordering};

use log::info;
use scopeguard::ScopeGuard;

use crate::config::VgaConfig;
use crate::error::Error;
use crate::framebuffer::{FrameBuffer, FrameStorage};
use crate::hw::Hardware;
use crate::timing::{VideoMode, VGA_640_480};

use self::dma_chain::FrameSource;

/// Drives a 640x480 monochrome display from PIO and DMA.
///
/// Once started, the signal is produced entirely by hardware: no interrupts,
/// no CPU time per pixel, line, or frame. Drawing into the frame buffer is
/// the only thing left for software to do.
pub struct VgaDriver<'a> {
    hw: Hardware<'a>,
    storage: &'a mut FrameStorage,
    config: VgaConfig,
    mode: &'static VideoMode,
    session: Option<Session>,
}

impl<'a> VgaDriver<'a> {
    /// Creates an idle driver. Nothing is touched until `start`.
    pub fn new(hw: Hardware<'a>, storage: &'a mut FrameStorage, config: VgaConfig) -> Self {
        VgaDriver {
            hw,
            storage,
            config,
            mode: &VGA_640_480,
            session: None,
        }
    }

    pub fn config(&self) -> &VgaConfig {
        &self.config
    }

    pub fn mode(&self) -> &'static VideoMode {
        self.mode
    }

    pub fn state(&self) -> DriverState {
        if self.session.is_some() {
            DriverState::Active
        } else {
            DriverState::Idle
        }
    }

    /// Details of the running session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Starts video output and returns the (blank) frame buffer.
    ///
    /// Fails with `InvalidState` if already running, `InvalidConfig` if the
    /// configuration is unusable, or `ResourceExhausted` if the hardware is
    /// taken. On failure the hardware is left as it was found.
    pub fn start(&mut self) -> Result<FrameBuffer<'_>, Error> {
        if self.session.is_some() {
            return Err(Error::InvalidState(DriverState::Active));
        }
        self.config.validate(self.mode)?;

        self.storage.reset();
        let frame = FrameSource {
            base: self.storage.pixels_address(),
            len: self.mode.frame_bytes() as u32,
            base_word: self.storage.base_word_address(),
        };

        let session = acquire(&self.hw, &self.config, self.mode, frame)?;
        info!(
            "video started on {} (GPIO {}/{}/{}, DMA {} via {})",
            session.block,
            self.config.hsync_pin,
            self.config.vsync_pin,
            self.config.color_pin,
            self.config.streaming_channel,
            self.config.activator_channel,
        );
        self.session = Some(session);
        Ok(self.storage.frame_buffer())
    }

    /// Stops video output and releases the hardware.
    ///
    /// The DMA chain is aborted mid-frame; the display loses sync
    /// immediately.
    pub fn stop(&mut self) -> Result<(), Error> {
        let session = self
            .session
            .take()
            .ok_or(Error::InvalidState(DriverState::Idle))?;
        release(&self.hw, &session);
        info!("video stopped on {}", session.block);
        Ok(())
    }

    /// Borrows the frame buffer of a running session.
    pub fn frame_buffer(&mut self) -> Option<FrameBuffer<'_>> {
        if self.session.is_some() {
            Some(self.storage.frame_buffer())
        } else {
            None
        }
    }

    /// Checks the DMA channels for bus errors.
    ///
    /// Not part of `start`; call it after starting if you want to know.
    pub fn verify(&self) -> Result<(), Error> {
        let session = self
            .session
            .as_ref()
            .ok_or(Error::InvalidState(DriverState::Idle))?;
        dma_chain::check_faults(self.hw.dma, &session.chain)
    }
}

/// Stops video if it's running. The frame storage borrow ends here, so the
/// DMA chain must not outlive it.
///
/// Leaking a running driver leaves the chain reading the storage after the
/// borrow ends. It only ever reads, but the picture will be garbage.
impl Drop for VgaDriver<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            release(&self.hw, &session);
        }
    }
}

/// Claims and arms the hardware. Each step registers its own undo, which runs
/// if a later step fails.
fn acquire(
    hw: &Hardware<'_>,
    config: &VgaConfig,
    mode: &VideoMode,
    frame: FrameSource,
) -> Result<Session, Error> {
    let block = allocator::select_block(hw, config.pio, config.allocation)?;
    let pio = hw.pio(block);

    let bindings = scopeguard::guard(
        allocator::bind(hw, block, config, mode)?,
        |bindings| allocator::release(pio, hw.io_bank0, &bindings),
    );

    let chain = dma_chain::plan(hw, block, config, frame);
    dma_chain::ensure_idle(hw.dma, &chain)?;
    dma_chain::configure(hw.dma, &chain);
    let chain = scopeguard::guard(chain, |chain| dma_chain::abort(hw.dma, &chain));

    // The frame and base word must be in memory before DMA goes looking.
    fence(Ordering::SeqCst);

    // Prime the COLOR FIFO, then start all three state machines at once.
    dma_chain::trigger(hw.dma, &chain);
    allocator::enable(pio, &*bindings);

    Ok(Session {
        block,
        bindings: ScopeGuard::into_inner(bindings),
        chain: ScopeGuard::into_inner(chain),
    })
}

fn release(hw: &Hardware<'_>, session: &Session) {
    dma_chain::abort(hw.dma, &session.chain);
    allocator::release(hw.pio(session.block), hw.io_bank0, &session.bindings);
}
