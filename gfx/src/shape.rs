//! Rectangles and ellipses.

use crate::Bitmap;

impl Bitmap<'_> {
    /// Draws a `w` x `h` rectangle with its top-left corner at `(x, y)`.
    ///
    /// If `filled` is false only the one-pixel outline is drawn. Rectangles
    /// with a non-positive width or height draw nothing.
    pub fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, on: bool, filled: bool) {
        if w <= 0 || h <= 0 {
            return;
        }
        let right = x.saturating_add(w - 1);
        let bottom = y.saturating_add(h - 1);
        if filled {
            let last_row = bottom.min(self.height() as i32 - 1);
            for row in y.max(0)..=last_row {
                self.span(x, right, row, on);
            }
        } else {
            self.span(x, right, y, on);
            self.span(x, right, bottom, on);
            self.vline(x, y, h, on);
            self.vline(right, y, h, on);
        }
    }

    /// Draws an axis-aligned ellipse centered on `(cx, cy)` with radii `rx`
    /// and `ry`.
    ///
    /// The ellipse touches `(cx +- rx, cy)` and `(cx, cy +- ry)`. A zero
    /// radius degenerates to a line; negative radii draw nothing. Only rows
    /// that land on the bitmap are computed, so huge ellipses cost no more
    /// than the bitmap is tall.
    pub fn ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, on: bool, filled: bool) {
        if rx < 0 || ry < 0 {
            return;
        }
        if ry == 0 {
            self.span(cx.saturating_sub(rx), cx.saturating_add(rx), cy, on);
            return;
        }

        // Half-width of the ellipse on row `dy` away from the center.
        let half_width = |dy: i64| -> i32 {
            let (rx, ry, dy) = (i128::from(rx), i128::from(ry), i128::from(dy));
            isqrt(rx * rx * (ry * ry - dy * dy) / (ry * ry)) as i32
        };

        let (cy, ry) = (i64::from(cy), i64::from(ry));
        let top = (cy - ry).max(0);
        let bottom = (cy + ry).min(self.height() as i64 - 1);
        for y in top..=bottom {
            let dy = (y - cy).abs();
            let hw = half_width(dy);
            let row = y as i32;
            if filled {
                self.span(cx.saturating_sub(hw), cx.saturating_add(hw), row, on);
            } else {
                // Extend each edge pixel back toward the edge on the row
                // nearer the center, so steep parts of the outline stay
                // connected.
                let inner = if dy == 0 { hw } else { half_width(dy - 1) };
                let reach = hw.max(inner - 1);
                self.span(cx.saturating_add(hw), cx.saturating_add(reach), row, on);
                self.span(cx.saturating_sub(hw), cx.saturating_sub(reach), row, on);
            }
        }
    }
}

/// Integer square root, rounded down.
fn isqrt(n: i128) -> i128 {
    if n < 2 {
        return n.max(0);
    }
    // Newton's method from an overestimate converges monotonically down.
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
