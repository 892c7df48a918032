//! Shared plumbing for the demo programs.
//!
//! Each demo is a drawing function. On the RP2040, `board::run` brings up the
//! clocks, starts video and draws into the live frame. On the host,
//! `preview::run` does the same against simulated hardware and prints a
//! coarse rendering of the frame to the terminal.

#![cfg_attr(target_os = "none", no_std)]

#[cfg(target_os = "none")]
pub mod board;

#[cfg(not(target_os = "none"))]
pub mod preview;

/// A demo: draws one frame into a freshly cleared bitmap.
pub type Demo = fn(&mut gfx::Bitmap);
