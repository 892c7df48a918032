//! Runs a demo on the host and shows roughly what it drew.

use std::fmt::Write;

use gfx::Bitmap;
use piovga::sim::SimulatedHardware;
use piovga::{FrameStorage, VgaConfig, VgaDriver};

use crate::Demo;

/// Each character of the preview stands for a block of this many pixels,
/// which keeps a 640x480 frame at 80x30 and roughly the right aspect ratio.
const CELL_WIDTH: usize = 8;
const CELL_HEIGHT: usize = 16;

pub fn run(demo: Demo) {
    let sim = SimulatedHardware::new();
    let mut storage = Box::new(FrameStorage::new());
    let mut vga = VgaDriver::new(sim.hardware(), &mut storage, VgaConfig::default());

    match vga.start() {
        Ok(mut fb) => {
            demo(&mut *fb);
            print!("{}", render(&fb));
        }
        Err(e) => {
            eprintln!("failed to start video: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(session) = vga.session() {
        println!(
            "{}, state machines {:#06b}, DMA channels {} and {}",
            session.block,
            session.slot_mask(),
            session.chain.streaming.channel,
            session.chain.activator.channel,
        );
    }
    if let Err(e) = vga.stop() {
        eprintln!("failed to stop video: {}", e);
        std::process::exit(1);
    }
}

/// Draws `bmp` as text, one character per cell: blank if the cell is
/// empty, `#` if at least half its pixels are set, `.` otherwise.
pub fn render(bmp: &Bitmap) -> String {
    let cols = (bmp.width() + CELL_WIDTH - 1) / CELL_WIDTH;
    let rows = (bmp.height() + CELL_HEIGHT - 1) / CELL_HEIGHT;
    let mut out = String::with_capacity((cols + 1) * rows);
    for row in 0..rows {
        for col in 0..cols {
            let mut set = 0;
            let mut total = 0;
            for y in row * CELL_HEIGHT..((row + 1) * CELL_HEIGHT).min(bmp.height()) {
                for x in col * CELL_WIDTH..((col + 1) * CELL_WIDTH).min(bmp.width()) {
                    total += 1;
                    if bmp.pixel(x as i32, y as i32) {
                        set += 1;
                    }
                }
            }
            out.push(match set {
                0 => ' ',
                n if n * 2 >= total => '#',
                _ => '.',
            });
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_reflect_coverage() {
        let mut buf = [0u8; 32 * 16 / 8];
        let mut bmp = Bitmap::new(&mut buf, 32, 16);
        // First cell fully set, second with a single pixel, rest empty.
        bmp.rect(0, 0, 8, 16, true, true);
        bmp.set_pixel(12, 3, true);
        assert_eq!(render(&bmp), "#.  \n");
    }

    #[test]
    fn partial_cells_at_the_edges_count() {
        let mut buf = [0u8; 2 * 12 / 8];
        let mut bmp = Bitmap::new(&mut buf, 12, 2);
        bmp.set_pixel(11, 1, true);
        bmp.set_pixel(10, 1, true);
        // Second cell is 4x2; two of eight pixels is less than half.
        assert_eq!(render(&bmp), " .\n");
    }
}
