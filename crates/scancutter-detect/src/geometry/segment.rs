// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::f64::consts::TAU;

use super::Point;

/// A directed segment from `p0` to `p1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p0: Point,
    pub p1: Point,
}

impl Segment {
    pub const fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }

    /// Direction from `p0` to `p1` in `[0, 2π)`, counter-clockwise as seen on
    /// screen (y is flipped since it grows downwards).
    ///
    /// Walking a rectangle clockwise from its top-left corner yields
    /// `0, 3π/2, π, π/2`; opposite sides of a parallelogram differ by π.
    pub fn angle(&self) -> f64 {
        let angle = (self.p0.y - self.p1.y).atan2(self.p1.x - self.p0.x);
        let wrapped = angle.rem_euclid(TAU);
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// Whether the two segments cross at a point interior to both.
    /// Touching endpoints and collinear overlaps do not count.
    pub fn crosses(&self, other: &Segment) -> bool {
        let d1 = orientation(other.p0, other.p1, self.p0);
        let d2 = orientation(other.p0, other.p1, self.p1);
        let d3 = orientation(self.p0, self.p1, other.p0);
        let d4 = orientation(self.p0, self.p1, other.p1);
        d1 * d2 < 0.0 && d3 * d4 < 0.0
    }
}

/// Signed area of the triangle `a, b, c` (twice over).
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
