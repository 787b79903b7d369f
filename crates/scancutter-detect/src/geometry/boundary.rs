// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use scancutter_core::error::Result;
use serde::{Deserialize, Serialize};

use super::{Line, Point, Segment};

/// The four lines delimiting one detected photograph.
///
/// Corners are always recomputed from the lines, never cached, so adjusting
/// a line can't leave stale corners behind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub top: Line,
    pub bottom: Line,
    pub left: Line,
    pub right: Line,
    /// `working_width / original_width` of the image the lines were found on.
    pub ratio: f64,
}

impl Boundary {
    pub fn new(top: Line, bottom: Line, left: Line, right: Line, ratio: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            ratio,
        }
    }

    pub fn top_left(&self) -> Result<Point> {
        self.top.intersect(&self.left)
    }

    pub fn top_right(&self) -> Result<Point> {
        self.top.intersect(&self.right)
    }

    pub fn bottom_right(&self) -> Result<Point> {
        self.bottom.intersect(&self.right)
    }

    pub fn bottom_left(&self) -> Result<Point> {
        self.bottom.intersect(&self.left)
    }

    /// Corners clockwise from the top-left one.
    pub fn corners(&self) -> Result<[Point; 4]> {
        Ok([
            self.top_left()?,
            self.top_right()?,
            self.bottom_right()?,
            self.bottom_left()?,
        ])
    }

    /// Sides top, right, bottom, left, each following the corner order.
    pub fn segments(&self) -> Result<[Segment; 4]> {
        let [p0, p1, p2, p3] = self.corners()?;
        Ok([
            Segment::new(p0, p1),
            Segment::new(p1, p2),
            Segment::new(p2, p3),
            Segment::new(p3, p0),
        ])
    }

    /// The same boundary in original-image coordinates.
    pub fn to_original(&self) -> Self {
        let factor = 1.0 / self.ratio;
        Self {
            top: self.top.scaled(factor),
            bottom: self.bottom.scaled(factor),
            left: self.left.scaled(factor),
            right: self.right.scaled(factor),
            ratio: 1.0,
        }
    }
}
