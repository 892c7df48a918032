//! Monochrome bitmap graphics algorithms.
//!
//! Everything here works on a packed 1-bit-per-pixel bitmap in the layout the
//! video hardware scans out: row-major, most significant bit first. Pixel
//! `(x, y)` lives in byte `(y * width + x) / 8`, at bit `7 - (y * width + x) %
//! 8`.
//!
//! This crate is deliberately architecture-independent to allow for testing on
//! the host.
//!
//! All drawing operations clip against the bitmap bounds, so shapes may extend
//! off-screen. None of them allocate: polygon filling uses fixed-capacity
//! scratch storage on the stack, which limits filled polygons to
//! [`MAX_POINTS`] vertices, and callers building point lists can reuse a
//! [`PointList`] between frames.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod bitmap;
mod line;
mod poly;
mod shape;

pub use crate::bitmap::Bitmap;
pub use crate::poly::{PointList, MAX_POINTS};

/// A pixel coordinate. Signed, so that shapes can be positioned partially
/// off-screen and clipped.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Translates `self` by `other`, saturating at the edges of the
    /// coordinate space.
    pub const fn offset(self, other: Point) -> Self {
        Point {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point { x, y }
    }
}
