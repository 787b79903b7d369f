// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangle assembler.
//
// Photos on a composite scan sit in a loose grid with small gaps. Three
// passes over adjacent flock pairs resolve one axis each:
//
// 1. horizontal flocks over the whole image give the rows,
// 2. vertical flocks supported within a row give the photos of that row,
// 3. horizontal flocks supported within a photo's columns give its exact
//    top and bottom, since photos sharing a row are rarely aligned.
//
// Boundaries come out axis-aligned; the extractor estimates the residual
// skew from the corners.

use scancutter_core::DetectionParams;
use scancutter_core::error::Result;
use tracing::{debug, info, instrument};

use super::cardinal::CardinalLines;
use super::detector::EdgeMap;
use super::flock::{Flock, flock_lines};
use super::presence::PresenceFilter;
use crate::geometry::{Boundary, Line};

/// Builds boundaries from the cardinal lines of one edge map.
pub struct RectangleAssembler<'a> {
    presence: PresenceFilter<'a>,
    width: u32,
    height: u32,
    spacing: f64,
    ratio: f64,
}

impl<'a> RectangleAssembler<'a> {
    /// `ratio` is stamped on every boundary (working width / original width).
    pub fn new(edges: &'a EdgeMap, params: &DetectionParams, ratio: f64) -> Self {
        Self {
            presence: PresenceFilter::new(edges, params.pixel_threshold_ratio),
            width: edges.width(),
            height: edges.height(),
            spacing: params.flock_spacing,
            ratio,
        }
    }

    /// One boundary per photo found. Fewer than two flocks at any pass just
    /// yields nothing for that row or column.
    #[instrument(skip_all, fields(
        horizontals = lines.horizontals.len(),
        verticals = lines.verticals.len()
    ))]
    pub fn assemble(&self, lines: &CardinalLines) -> Result<Vec<Boundary>> {
        let rows = flock_lines(&lines.horizontals, self.height, self.spacing);
        debug!(flocks = rows.len(), "Horizontal bands split");

        let mut boundaries = Vec::new();
        for pair in rows.windows(2) {
            let [above, below] = pair else { continue };
            self.photos_in_row(above, below, lines, &mut boundaries)?;
        }

        info!(boundaries = boundaries.len(), "Rectangles assembled");
        Ok(boundaries)
    }

    /// Pass 2: split the row between `above` and `below` into columns.
    fn photos_in_row(
        &self,
        above: &Flock,
        below: &Flock,
        lines: &CardinalLines,
        boundaries: &mut Vec<Boundary>,
    ) -> Result<()> {
        // The last line above and the first below bound the row most tightly.
        let top_y = above.last().y0();
        let bottom_y = below.first().y0();
        let mid_y = (top_y + bottom_y) / 2.0;

        let verticals = self
            .presence
            .supported_verticals(&lines.verticals, top_y, bottom_y)?;
        let columns = flock_lines(&verticals, self.width, self.spacing);
        debug!(top_y, bottom_y, flocks = columns.len(), "Vertical bands split");

        // Horizontal candidates for pass 3: anything within the outer lines
        // of the two row flocks.
        let band_top = above.first().y0();
        let band_bottom = below.last().y0();
        let band: Vec<Line> = lines
            .horizontals
            .iter()
            .filter(|line| (band_top..=band_bottom).contains(&line.y0()))
            .copied()
            .collect();

        for pair in columns.windows(2) {
            let [before, after] = pair else { continue };
            let left = *before.rightmost_at(mid_y)?;
            let right = *after.leftmost_at(mid_y)?;
            self.photos_in_column(&band, left, right, boundaries)?;
        }
        Ok(())
    }

    /// Pass 3: find the exact top and bottom between `left` and `right`.
    fn photos_in_column(
        &self,
        band: &[Line],
        left: Line,
        right: Line,
        boundaries: &mut Vec<Boundary>,
    ) -> Result<()> {
        let left_x = left.x0();
        let right_x = right.x0();
        let mid_x = (left_x + right_x) / 2.0;

        let horizontals = self.presence.supported_horizontals(band, left_x, right_x)?;
        let edges = flock_lines(&horizontals, self.height, self.spacing);
        debug!(left_x, right_x, flocks = edges.len(), "Photo bands split");

        for pair in edges.windows(2) {
            let [upper, lower] = pair else { continue };
            let top = *upper.bottommost_at(mid_x)?;
            let bottom = *lower.topmost_at(mid_x)?;
            boundaries.push(Boundary::new(top, bottom, left, right, self.ratio));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use image::{GrayImage, Luma};

    use super::*;

    fn h(rho: f64) -> Line {
        Line::new(rho, FRAC_PI_2)
    }

    fn v(rho: f64) -> Line {
        Line::new(rho, 0.0)
    }

    /// Edge map with the outline of each `(x0, y0, x1, y1)` rectangle lit.
    fn outlined(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> EdgeMap {
        let mut gray = GrayImage::new(width, height);
        for &(x0, y0, x1, y1) in rects {
            for x in x0..=x1 {
                gray.put_pixel(x, y0, Luma([255u8]));
                gray.put_pixel(x, y1, Luma([255u8]));
            }
            for y in y0..=y1 {
                gray.put_pixel(x0, y, Luma([255u8]));
                gray.put_pixel(x1, y, Luma([255u8]));
            }
        }
        EdgeMap::new(gray)
    }

    fn corners(boundary: &Boundary) -> Vec<(f64, f64)> {
        boundary
            .corners()
            .expect("corners")
            .iter()
            .map(|p| (p.x.round(), p.y.round()))
            .collect()
    }

    #[test]
    fn single_photo() {
        let edges = outlined(400, 400, &[(50, 50, 150, 150)]);
        let lines = CardinalLines {
            horizontals: vec![h(50.0), h(150.0)],
            verticals: vec![v(50.0), v(150.0)],
        };
        let boundaries = RectangleAssembler::new(&edges, &DetectionParams::default(), 1.0)
            .assemble(&lines)
            .expect("assemble");
        assert_eq!(boundaries.len(), 1);
        assert_eq!(
            corners(&boundaries[0]),
            vec![(50.0, 50.0), (150.0, 50.0), (150.0, 150.0), (50.0, 150.0)]
        );
    }

    #[test]
    fn two_photos_in_a_row_with_staggered_edges() {
        // Second photo sits 8 px lower than the first, inside one flock.
        let edges = outlined(600, 1000, &[(40, 40, 240, 400), (300, 48, 540, 408)]);
        let lines = CardinalLines {
            horizontals: vec![h(40.0), h(48.0), h(400.0), h(408.0)],
            verticals: vec![v(40.0), v(240.0), v(300.0), v(540.0)],
        };
        let boundaries = RectangleAssembler::new(&edges, &DetectionParams::default(), 1.0)
            .assemble(&lines)
            .expect("assemble");
        let found: Vec<_> = boundaries.iter().map(corners).collect();
        assert_eq!(found.len(), 2, "{found:?}");
        assert!(found.contains(&vec![(40.0, 40.0), (240.0, 40.0), (240.0, 400.0), (40.0, 400.0)]), "{found:?}");
        assert!(found.contains(&vec![(300.0, 48.0), (540.0, 48.0), (540.0, 408.0), (300.0, 408.0)]), "{found:?}");
    }

    #[test]
    fn nearby_duplicate_lines_collapse_to_the_inner_edge() {
        let edges = outlined(400, 400, &[(50, 50, 150, 150), (49, 49, 151, 151)]);
        let lines = CardinalLines {
            horizontals: vec![h(49.0), h(50.0), h(150.0), h(151.0)],
            verticals: vec![v(49.0), v(50.0), v(150.0), v(151.0)],
        };
        let boundaries = RectangleAssembler::new(&edges, &DetectionParams::default(), 1.0)
            .assemble(&lines)
            .expect("assemble");
        assert_eq!(boundaries.len(), 1);
        assert_eq!(
            corners(&boundaries[0]),
            vec![(50.0, 50.0), (150.0, 50.0), (150.0, 150.0), (50.0, 150.0)]
        );
    }

    #[test]
    fn empty_line_sets_give_no_boundaries() {
        let edges = outlined(400, 400, &[(50, 50, 150, 150)]);
        let assembler = RectangleAssembler::new(&edges, &DetectionParams::default(), 1.0);
        let no_verticals = CardinalLines {
            horizontals: vec![h(50.0), h(150.0)],
            verticals: vec![],
        };
        let no_horizontals = CardinalLines {
            horizontals: vec![],
            verticals: vec![v(50.0), v(150.0)],
        };
        assert!(assembler.assemble(&no_verticals).expect("ok").is_empty());
        assert!(assembler.assemble(&no_horizontals).expect("ok").is_empty());
        assert!(assembler.assemble(&CardinalLines::default()).expect("ok").is_empty());
    }

    #[test]
    fn unsupported_verticals_are_ignored() {
        // The line at x = 300 has no edge pixels at all.
        let edges = outlined(400, 400, &[(50, 50, 150, 150)]);
        let lines = CardinalLines {
            horizontals: vec![h(50.0), h(150.0)],
            verticals: vec![v(50.0), v(150.0), v(300.0)],
        };
        let boundaries = RectangleAssembler::new(&edges, &DetectionParams::default(), 1.0)
            .assemble(&lines)
            .expect("assemble");
        assert_eq!(boundaries.len(), 1);
    }

    #[test]
    fn boundaries_carry_the_ratio() {
        let edges = outlined(400, 400, &[(50, 50, 150, 150)]);
        let lines = CardinalLines {
            horizontals: vec![h(50.0), h(150.0)],
            verticals: vec![v(50.0), v(150.0)],
        };
        let boundaries = RectangleAssembler::new(&edges, &DetectionParams::default(), 0.25)
            .assemble(&lines)
            .expect("assemble");
        assert_eq!(boundaries[0].ratio, 0.25);
    }
}
