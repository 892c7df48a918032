//! The packed 1bpp bitmap and its pixel-level operations.

/// A mutable view of a packed 1bpp bitmap.
///
/// The bitmap does not own its storage; it borrows a byte slice for as long as
/// it's being drawn into. This lets the same code draw into a video frame
/// buffer or into a plain array in a test.
#[derive(Debug)]
pub struct Bitmap<'a> {
    bytes: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Bitmap<'a> {
    /// Wraps `bytes` as a `width` x `height` bitmap.
    ///
    /// # Panics
    ///
    /// If `bytes` is not exactly `ceil(width * height / 8)` bytes long.
    pub fn new(bytes: &'a mut [u8], width: usize, height: usize) -> Self {
        let bits = width * height;
        assert_eq!(
            bytes.len(),
            (bits + 7) / 8,
            "{}x{} bitmap needs {} bytes",
            width,
            height,
            (bits + 7) / 8,
        );
        Bitmap {
            bytes,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// Converts a coordinate into a linear bit index, or `None` if it's off
    /// the bitmap.
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Reads the pixel at `(x, y)`. Pixels off the bitmap read as unset.
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => self.bytes[i / 8] & mask(i) != 0,
            None => false,
        }
    }

    /// Sets or clears the pixel at `(x, y)`. Pixels off the bitmap are
    /// ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some(i) = self.index(x, y) {
            if on {
                self.bytes[i / 8] |= mask(i);
            } else {
                self.bytes[i / 8] &= !mask(i);
            }
        }
    }

    /// Sets every pixel to `on`.
    pub fn fill(&mut self, on: bool) {
        let value = if on { 0xFF } else { 0 };
        for b in self.bytes.iter_mut() {
            *b = value;
        }
    }

    /// Draws a horizontal run of `len` pixels starting at `(x, y)` and
    /// extending right.
    pub fn hline(&mut self, x: i32, y: i32, len: i32, on: bool) {
        if len > 0 {
            self.span(x, x.saturating_add(len - 1), y, on)
        }
    }

    /// Draws a vertical run of `len` pixels starting at `(x, y)` and extending
    /// down.
    pub fn vline(&mut self, x: i32, y: i32, len: i32, on: bool) {
        if len <= 0 {
            return;
        }
        let top = y.max(0);
        let bottom = y.saturating_add(len - 1).min(self.height as i32 - 1);
        for row in top..=bottom {
            self.set_pixel(x, row, on);
        }
    }

    /// Fills the pixels from `x0` to `x1` inclusive on row `y`. The endpoints
    /// may be given in either order.
    pub(crate) fn span(&mut self, x0: i32, x1: i32, y: i32, on: bool) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let lo = lo.max(0);
        let hi = hi.min(self.width as i32 - 1);
        if lo > hi {
            return;
        }
        let row = y as usize * self.width;
        self.fill_bits(row + lo as usize, row + hi as usize + 1, on);
    }

    /// Sets or clears the half-open range of linear bit indices
    /// `start..end`, a byte at a time where possible.
    fn fill_bits(&mut self, start: usize, end: usize, on: bool) {
        let mut i = start;
        while i < end && i % 8 != 0 {
            self.write_bit(i, on);
            i += 1;
        }
        let value = if on { 0xFF } else { 0 };
        while i + 8 <= end {
            self.bytes[i / 8] = value;
            i += 8;
        }
        while i < end {
            self.write_bit(i, on);
            i += 1;
        }
    }

    fn write_bit(&mut self, i: usize, on: bool) {
        if on {
            self.bytes[i / 8] |= mask(i);
        } else {
            self.bytes[i / 8] &= !mask(i);
        }
    }
}

/// Mask selecting linear bit `i` within its byte. Pixels are packed MSB first.
fn mask(i: usize) -> u8 {
    0x80 >> (i % 8)
}
