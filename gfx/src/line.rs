//! Line drawing.

use core::mem::swap;

use crate::{Bitmap, Point};

#[derive(Debug)]
enum Direction {
    Horizontal,
    Vertical,
}

impl Bitmap<'_> {
    /// Draws a line from `p0` to `p1` inclusive, using Bresenham's algorithm.
    ///
    /// Either or both endpoints may be off the bitmap; pixels that fall
    /// outside are skipped.
    pub fn line(&mut self, p0: Point, p1: Point, on: bool) {
        // Widened so the deltas can't overflow; every pixel visited still lies
        // between the endpoints and fits back in an i32.
        let (mut x0, mut y0, mut x1, mut y1) = (
            i64::from(p0.x),
            i64::from(p0.y),
            i64::from(p1.x),
            i64::from(p1.y),
        );
        // Flip things as necessary to ensure that we draw horizontal or
        // top-to-bottom.
        if y0 > y1 {
            swap(&mut y0, &mut y1);
            swap(&mut x0, &mut x1);
        }

        let dx = x1 - x0; // may be negative
        let dy = y1 - y0; // nonnegative

        let (dx, x_adv) = if dx > 0 { (dx, 1) } else { (-dx, -1) };
        let dir = if dx > dy {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };

        let (dmajor, dminor) = match dir {
            Direction::Horizontal => (dx, dy),
            Direction::Vertical => (dy, dx),
        };
        // Steps are (x, y) deltas.
        let (major_step, minor_step) = match dir {
            Direction::Horizontal => ((x_adv, 0), (0, 1)),
            Direction::Vertical => ((0, 1), (x_adv, 0)),
        };

        let dminor2 = dminor * 2;
        let dmajor2 = dmajor * 2;
        let mut error = dminor2 - dmajor;

        let (mut x, mut y) = (x0, y0);
        self.set_pixel(x as i32, y as i32, on);

        for _ in 0..dmajor {
            if error >= 0 {
                x += minor_step.0;
                y += minor_step.1;
                error -= dmajor2;
            }
            error += dminor2;
            x += major_step.0;
            y += major_step.1;
            self.set_pixel(x as i32, y as i32, on);
        }
    }
}
