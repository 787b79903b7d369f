// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel-presence filter.
//
// Hough lines are infinite and say nothing about where their edge evidence
// lies. Before a line can bound a photo it must be backed by enough lit
// edge pixels inside the span being examined.

use scancutter_core::error::Result;
use tracing::debug;

use super::detector::EdgeMap;
use crate::geometry::Line;

/// Orientation of the lines being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Sampled along y; `x` comes from the line.
    Vertical,
    /// Sampled along x; `y` comes from the line.
    Horizontal,
}

/// Tests lines against one edge map.
#[derive(Debug, Clone, Copy)]
pub struct PresenceFilter<'a> {
    edges: &'a EdgeMap,
    threshold_ratio: u32,
}

impl<'a> PresenceFilter<'a> {
    pub fn new(edges: &'a EdgeMap, threshold_ratio: u32) -> Self {
        Self {
            edges,
            threshold_ratio: threshold_ratio.max(1),
        }
    }

    /// Lit pixels needed for a line of the given orientation: a fraction of
    /// the image extent along the line, never less than one.
    pub fn threshold(&self, axis: Axis) -> usize {
        let extent = match axis {
            Axis::Vertical => self.edges.height(),
            Axis::Horizontal => self.edges.width(),
        };
        ((extent / self.threshold_ratio) as usize).max(1)
    }

    /// Count lit pixels on `line` for every integer step from `from` to `to`
    /// (inclusive) along the sampling axis. Samples falling outside the
    /// raster are skipped.
    pub fn count_lit(&self, line: &Line, axis: Axis, from: f64, to: f64) -> Result<usize> {
        if !(to >= from) {
            return Ok(0);
        }
        let steps = (to - from).floor() as u64;
        let mut lit = 0;
        for i in 0..=steps {
            let t = from + i as f64;
            let (x, y) = match axis {
                Axis::Vertical => (line.x_at(t)?, t),
                Axis::Horizontal => (t, line.y_at(t)?),
            };
            if self.edges.is_lit(x.round() as i64, y.round() as i64) {
                lit += 1;
            }
        }
        Ok(lit)
    }

    /// Whether `line` has enough edge support between `from` and `to`.
    pub fn is_supported(&self, line: &Line, axis: Axis, from: f64, to: f64) -> Result<bool> {
        let lit = self.count_lit(line, axis, from, to)?;
        let supported = lit >= self.threshold(axis);
        if supported {
            debug!(?line, ?axis, lit, from, to, "Line supported by edge pixels");
        }
        Ok(supported)
    }

    /// Vertical lines supported over the rows `top..=bottom`.
    pub fn supported_verticals(&self, lines: &[Line], top: f64, bottom: f64) -> Result<Vec<Line>> {
        self.retain_supported(lines, Axis::Vertical, top, bottom)
    }

    /// Horizontal lines supported over the columns `left..=right`.
    pub fn supported_horizontals(&self, lines: &[Line], left: f64, right: f64) -> Result<Vec<Line>> {
        self.retain_supported(lines, Axis::Horizontal, left, right)
    }

    fn retain_supported(&self, lines: &[Line], axis: Axis, from: f64, to: f64) -> Result<Vec<Line>> {
        let mut kept = Vec::with_capacity(lines.len());
        for line in lines {
            if self.is_supported(line, axis, from, to)? {
                kept.push(*line);
            }
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use image::{GrayImage, Luma};

    use super::*;

    /// 200x100 map with a lit column at x = 40 over rows 10..60 and a lit
    /// row at y = 80 over columns 0..200.
    fn edges() -> EdgeMap {
        let mut gray = GrayImage::new(200, 100);
        for y in 10..60 {
            gray.put_pixel(40, y, Luma([255u8]));
        }
        for x in 0..200 {
            gray.put_pixel(x, 80, Luma([255u8]));
        }
        EdgeMap::new(gray)
    }

    #[test]
    fn threshold_uses_extent_along_the_line() {
        let map = edges();
        let filter = PresenceFilter::new(&map, 10);
        assert_eq!(filter.threshold(Axis::Vertical), 10);
        assert_eq!(filter.threshold(Axis::Horizontal), 20);
    }

    #[test]
    fn counts_only_inside_the_interval() {
        let map = edges();
        let filter = PresenceFilter::new(&map, 10);
        let column = Line::new(40.0, 0.0);
        assert_eq!(filter.count_lit(&column, Axis::Vertical, 0.0, 70.0).expect("count"), 50);
        assert_eq!(filter.count_lit(&column, Axis::Vertical, 20.0, 29.0).expect("count"), 10);
        assert_eq!(filter.count_lit(&column, Axis::Vertical, 61.0, 79.0).expect("count"), 0);
        // The lit row crosses the column at y = 80.
        assert_eq!(filter.count_lit(&column, Axis::Vertical, 0.0, 99.0).expect("count"), 51);
    }

    #[test]
    fn unlit_line_is_always_rejected() {
        let map = edges();
        let empty = Line::new(150.0, 0.0);
        for ratio in [1, 10, 1000, u32::MAX] {
            let filter = PresenceFilter::new(&map, ratio);
            assert_eq!(filter.count_lit(&empty, Axis::Vertical, 0.0, 70.0).expect("count"), 0);
            assert!(!filter.is_supported(&empty, Axis::Vertical, 0.0, 70.0).expect("support"));
        }
    }

    #[test]
    fn out_of_bounds_samples_are_skipped() {
        let map = edges();
        let filter = PresenceFilter::new(&map, 10);
        let row = Line::new(80.0, FRAC_PI_2);
        // Half of the span lies left of the image.
        assert_eq!(filter.count_lit(&row, Axis::Horizontal, -100.0, 99.0).expect("count"), 100);
    }

    #[test]
    fn keeps_supported_lines_only() {
        let map = edges();
        let filter = PresenceFilter::new(&map, 10);
        let lines = [Line::new(40.0, 0.0), Line::new(120.0, 0.0)];
        let kept = filter.supported_verticals(&lines, 0.0, 99.0).expect("filter");
        assert_eq!(kept, vec![Line::new(40.0, 0.0)]);

        let rows = [Line::new(30.0, FRAC_PI_2), Line::new(80.0, FRAC_PI_2)];
        let kept = filter.supported_horizontals(&rows, 0.0, 199.0).expect("filter");
        assert_eq!(kept, vec![Line::new(80.0, FRAC_PI_2)]);
    }

    #[test]
    fn reversed_interval_counts_nothing() {
        let map = edges();
        let filter = PresenceFilter::new(&map, 10);
        assert_eq!(filter.count_lit(&Line::new(40.0, 0.0), Axis::Vertical, 50.0, 10.0).expect("count"), 0);
    }
}
