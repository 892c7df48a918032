//! Polylines and polygons.

use arrayvec::{ArrayVec, CapacityError};

use crate::{Bitmap, Point};

/// Largest number of vertices a [`PointList`] can hold. This also bounds the
/// number of edge crossings considered per scanline when filling.
pub const MAX_POINTS: usize = 64;

/// Fixed-capacity vertex list, for building shapes without an allocator.
pub type PointList = ArrayVec<Point, MAX_POINTS>;

impl Bitmap<'_> {
    /// Draws connected line segments through `points`, in order. The path is
    /// left open.
    pub fn polyline(&mut self, points: &[Point], on: bool) {
        match points {
            [] => (),
            [p] => self.set_pixel(p.x, p.y, on),
            _ => {
                for pair in points.windows(2) {
                    self.line(pair[0], pair[1], on);
                }
            }
        }
    }

    /// Draws the closed polygon with vertices `points`, each translated by
    /// `origin`.
    ///
    /// Filling uses the even-odd rule, sampling each scanline through pixel
    /// centers. The outline is always drawn, so a filled polygon covers its
    /// edges too.
    ///
    /// A filled polygon may have at most [`MAX_POINTS`] vertices, since each
    /// edge can cross a scanline and the crossings are kept in fixed
    /// storage. Beyond that nothing is drawn, and the first vertex that
    /// didn't fit comes back in the error. Outlines have no limit.
    pub fn polygon(
        &mut self,
        origin: Point,
        points: &[Point],
        on: bool,
        filled: bool,
    ) -> Result<(), CapacityError<Point>> {
        if points.is_empty() {
            return Ok(());
        }

        if filled {
            if let Some(&extra) = points.get(MAX_POINTS) {
                return Err(CapacityError::new(extra));
            }
            self.fill_polygon(origin, points, on);
        }

        for (i, &p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            self.line(p.offset(origin), q.offset(origin), on);
        }
        Ok(())
    }

    /// Requires `points.len() <= MAX_POINTS`.
    fn fill_polygon(&mut self, origin: Point, points: &[Point], on: bool) {
        let (ymin, ymax) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
        let ymin = ymin.saturating_add(origin.y).max(0);
        let ymax = ymax.saturating_add(origin.y).min(self.height() as i32 - 1);

        let mut crossings = ArrayVec::<i32, MAX_POINTS>::new();
        for y in ymin..=ymax {
            crossings.clear();
            // Local row, so edge math happens in the caller's coordinates.
            let ly = i64::from(y) - i64::from(origin.y);
            for (i, &a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                let (ax, ay, bx, by) = (
                    i64::from(a.x),
                    i64::from(a.y),
                    i64::from(b.x),
                    i64::from(b.y),
                );
                // Half-open in y, so shared vertices count once and
                // horizontal edges not at all.
                let crosses = (ay <= ly && by > ly) || (by <= ly && ay > ly);
                if !crosses {
                    continue;
                }
                let x = ax + (ly - ay) * (bx - ax) / (by - ay) + i64::from(origin.x);
                let x = x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                // At most one crossing per edge, and there are no more edges
                // than MAX_POINTS.
                crossings.push(x);
            }
            crossings.sort_unstable();
            for pair in crossings.chunks_exact(2) {
                self.span(pair[0], pair[1], y, on);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 64;
    const H: usize = 64;

    fn pts(coords: &[(i32, i32)]) -> PointList {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    fn count_set(bmp: &Bitmap) -> usize {
        bmp.as_bytes().iter().map(|b| b.count_ones() as usize).sum()
    }

    #[test]
    fn polyline_is_open() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        bmp.polyline(&pts(&[(0, 0), (10, 0), (10, 10)]), true);
        assert!(bmp.pixel(5, 0));
        assert!(bmp.pixel(10, 5));
        // No closing edge back to the start.
        assert!(!bmp.pixel(5, 5));
        assert_eq!(count_set(&bmp), 21);
    }

    #[test]
    fn polyline_single_point() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        bmp.polyline(&pts(&[(4, 4)]), true);
        bmp.polyline(&[], true);
        assert_eq!(count_set(&bmp), 1);
    }

    #[test]
    fn outline_polygon_is_closed() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        bmp.polygon(Point::new(0, 0), &pts(&[(0, 0), (10, 0), (10, 10)]), true, false).unwrap();
        assert!(bmp.pixel(5, 5));
        assert!(!bmp.pixel(8, 3) && bmp.pixel(10, 3));
    }

    #[test]
    fn filled_square_matches_rect() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        let square = pts(&[(0, 0), (9, 0), (9, 9), (0, 9)]);
        bmp.polygon(Point::new(5, 5), &square, true, true).unwrap();

        let mut expected = [0; W * H / 8];
        Bitmap::new(&mut expected, W, H).rect(5, 5, 10, 10, true, true);
        assert_eq!(&buf[..], &expected[..]);
    }

    #[test]
    fn filled_triangle_has_no_holes() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        let tri = pts(&[(32, 2), (60, 60), (4, 60)]);
        bmp.polygon(Point::new(0, 0), &tri, true, true).unwrap();

        // Every row between the apex and the base is one contiguous run.
        for y in 2..=60 {
            let row: ArrayVec<i32, W> = (0..W as i32).filter(|&x| bmp.pixel(x, y)).collect();
            assert!(!row.is_empty(), "row {} empty", y);
            let (first, last) = (row[0], row[row.len() - 1]);
            assert_eq!(row.len() as i32, last - first + 1, "row {} has a gap", y);
        }
        assert!(bmp.pixel(32, 40));
        assert!(!bmp.pixel(32, 1));
        assert!(!bmp.pixel(32, 61));
    }

    #[test]
    fn even_odd_leaves_hole_in_nested_shape() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        // Outer square, then a cut into an inner square wound the same way.
        let shape = pts(&[
            (0, 0),
            (40, 0),
            (40, 40),
            (0, 40),
            (0, 10),
            (10, 10),
            (10, 30),
            (30, 30),
            (30, 10),
            (0, 10),
        ]);
        bmp.polygon(Point::new(0, 0), &shape, true, true).unwrap();
        assert!(bmp.pixel(5, 5));
        assert!(bmp.pixel(35, 20));
        assert!(!bmp.pixel(20, 20));
    }

    /// A comb with `teeth` two-pixel teeth on four-pixel centers, rising from
    /// a solid base at rows 10..=20 to row 0. Every row above the base
    /// crosses two edges per tooth.
    fn comb(teeth: i32) -> ArrayVec<Point, 256> {
        let mut points = ArrayVec::new();
        points.push(Point::new(0, 20));
        for i in 0..teeth {
            points.push(Point::new(4 * i, 0));
            points.push(Point::new(4 * i + 2, 0));
            points.push(Point::new(4 * i + 2, 10));
            points.push(Point::new(4 * i + 4, 10));
        }
        points.push(Point::new(4 * teeth, 20));
        points
    }

    #[test]
    fn filled_polygon_at_capacity_fills_every_span() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        let shape = comb(15);
        assert_eq!(shape.len(), 62);
        bmp.polygon(Point::new(0, 0), &shape, true, true).unwrap();
        for i in 0..15 {
            assert!(bmp.pixel(4 * i + 1, 5), "tooth {} should be filled", i);
            assert!(!bmp.pixel(4 * i + 3, 5), "gap {} should be clear", i);
        }
        assert!((0..=60).all(|x| bmp.pixel(x, 15)));
    }

    #[test]
    fn filled_polygon_over_capacity_is_refused() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        let shape = comb(16);
        assert_eq!(shape.len(), 66);
        let err = bmp.polygon(Point::new(0, 0), &shape, true, true).unwrap_err();
        assert_eq!(err.element(), shape[MAX_POINTS]);
        assert_eq!(count_set(&bmp), 0);

        // The outline alone has no limit.
        bmp.polygon(Point::new(0, 0), &shape, true, false).unwrap();
        assert!(bmp.pixel(61, 0));
        assert!(!bmp.pixel(61, 5));
    }

    #[test]
    fn polygon_clips_off_screen() {
        let mut buf = [0; W * H / 8];
        let mut bmp = Bitmap::new(&mut buf, W, H);
        let square = pts(&[(0, 0), (99, 0), (99, 99), (0, 99)]);
        bmp.polygon(Point::new(-20, -20), &square, true, true).unwrap();
        assert!(bmp.as_bytes().iter().all(|&b| b == 0xFF));
    }
}
