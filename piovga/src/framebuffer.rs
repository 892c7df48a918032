//! Frame buffer storage, and the handle drawing code gets to it.

use core::ops::{Deref, DerefMut};

use gfx::Bitmap;

use crate::hw::bus_address;
use crate::timing::VGA_640_480;

pub const WIDTH: usize = VGA_640_480.width;
pub const HEIGHT: usize = VGA_640_480.height;

/// Size of a frame, in bytes.
pub const FRAME_BYTES: usize = VGA_640_480.frame_bytes();

/// Memory that the DMA chain streams to the display.
///
/// Besides the pixels themselves this holds the one word the activator
/// channel copies on every frame: the address of the pixels. Both have to stay
/// put while video is running, which the driver ensures by borrowing the
/// storage for its whole lifetime.
///
/// This is 38 KiB; put it in a `static`, not on the stack.
#[repr(C, align(4))]
pub struct FrameStorage {
    pixels: [u8; FRAME_BYTES],
    base_word: u32,
}

impl FrameStorage {
    pub const fn new() -> Self {
        FrameStorage {
            pixels: [0; FRAME_BYTES],
            base_word: 0,
        }
    }

    /// Bus address of the first pixel byte.
    pub fn pixels_address(&self) -> u32 {
        bus_address(&self.pixels[..])
    }

    /// Bus address of the word holding `pixels_address()`.
    pub fn base_word_address(&self) -> u32 {
        bus_address(&self.base_word)
    }

    pub fn base_word(&self) -> u32 {
        self.base_word
    }

    /// Clears the frame and points the base word at it.
    pub(crate) fn reset(&mut self) {
        self.pixels.fill(0);
        self.base_word = self.pixels_address();
    }

    pub(crate) fn frame_buffer(&mut self) -> FrameBuffer<'_> {
        let base = self.pixels_address();
        FrameBuffer {
            bitmap: Bitmap::new(&mut self.pixels[..], WIDTH, HEIGHT),
            base,
        }
    }
}

impl Default for FrameStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// The frame being displayed.
///
/// Dereferences to a [`gfx::Bitmap`] for drawing. There's only one buffer, and
/// the hardware reads it continuously, so anything drawn becomes visible
/// partway through a frame; expect tearing on animation.
pub struct FrameBuffer<'a> {
    bitmap: Bitmap<'a>,
    base: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Bus address the DMA chain restarts from each frame.
    pub fn base_address(&self) -> u32 {
        self.base
    }

    /// Length in bytes; always `FRAME_BYTES`.
    pub fn len(&self) -> usize {
        self.bitmap.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> Deref for FrameBuffer<'a> {
    type Target = Bitmap<'a>;

    fn deref(&self) -> &Self::Target {
        &self.bitmap
    }
}

impl<'a> DerefMut for FrameBuffer<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bitmap
    }
}
