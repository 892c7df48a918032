//! A border, both diagonals and a disc in the middle. Enough to check a
//! monitor's geometry at a glance: the border should sit exactly on the edges
//! of the picture, and the disc should look round.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

use gfx::{Bitmap, Point};

fn draw(fb: &mut Bitmap) {
    let (w, h) = (fb.width() as i32, fb.height() as i32);

    fb.rect(0, 0, w, h, true, false);
    fb.line(Point::new(0, 0), Point::new(w - 1, h - 1), true);
    fb.line(Point::new(w - 1, 0), Point::new(0, h - 1), true);

    // Tick marks every 40 pixels along the top and left edges.
    for x in (0..w).step_by(40) {
        fb.vline(x, 1, 8, true);
    }
    for y in (0..h).step_by(40) {
        fb.hline(1, y, 8, true);
    }

    fb.ellipse(w / 2, h / 2, 100, 100, true, true);
    // Knock a smaller hole out of the middle.
    fb.ellipse(w / 2, h / 2, 40, 40, false, true);
}

#[cfg(target_os = "none")]
#[cortex_m_rt::entry]
fn main() -> ! {
    demos::board::run(draw)
}

#[cfg(not(target_os = "none"))]
fn main() {
    demos::preview::run(draw)
}
