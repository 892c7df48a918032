//! A sampler of the drawing primitives: outlined and filled rectangles and
//! ellipses, a self-intersecting polygon filled even-odd, and an open
//! polyline.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

use gfx::{Bitmap, Point, PointList};

/// A five-pointed star of radius 100, drawn point-to-every-other-point so
/// the even-odd fill leaves the pentagon in the middle empty.
const STAR: [Point; 5] = [
    Point::new(0, -100),
    Point::new(59, 81),
    Point::new(-95, -31),
    Point::new(95, -31),
    Point::new(-59, 81),
];

fn draw(fb: &mut Bitmap) {
    // Top row: rectangles.
    fb.rect(20, 20, 160, 100, true, false);
    fb.rect(200, 20, 160, 100, true, true);
    fb.rect(240, 45, 80, 50, false, true);

    // Ellipses down the right-hand side.
    fb.ellipse(520, 70, 100, 50, true, false);
    fb.ellipse(520, 200, 60, 60, true, true);
    fb.ellipse(520, 330, 20, 80, true, false);

    fb.polygon(Point::new(180, 260), &STAR, true, true).unwrap();

    // A sawtooth along the bottom.
    let mut wave = PointList::new();
    for i in 0..wave.capacity() as i32 {
        let y = if i % 2 == 0 { 440 } else { 400 };
        wave.push(Point::new(20 + i * 9, y));
    }
    fb.polyline(&wave, true);
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
