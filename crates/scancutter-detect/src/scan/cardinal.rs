// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cardinal line filter: keep the near-horizontal and near-vertical lines,
// drop the oblique ones.

use tracing::debug;

use super::detector::RawLine;
use crate::geometry::Line;

/// Detector lines split by orientation, each list sorted by ascending `rho`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardinalLines {
    pub horizontals: Vec<Line>,
    pub verticals: Vec<Line>,
}

impl CardinalLines {
    pub fn is_empty(&self) -> bool {
        self.horizontals.is_empty() && self.verticals.is_empty()
    }

    /// Every kept line, horizontals first.
    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.horizontals.iter().chain(self.verticals.iter())
    }
}

/// Classify lines by the angle of their normal.
///
/// With `tol = |sin ε|`, a line is horizontal when `|cos θ| < tol`, otherwise
/// vertical when `sin θ < tol`; anything else is discarded.
pub fn filter_cardinal(lines: &[RawLine], tolerance: f64) -> CardinalLines {
    let tol = tolerance.sin().abs();
    let mut horizontals = Vec::with_capacity(20);
    let mut verticals = Vec::with_capacity(20);

    for raw in lines {
        let line = Line::new(raw.rho, raw.theta);
        let theta = line.theta();
        if theta.cos().abs() < tol {
            horizontals.push(line);
        } else if theta.sin() < tol {
            verticals.push(line);
        }
    }

    let dropped = lines.len() - horizontals.len() - verticals.len();
    horizontals.sort_by(|a, b| a.rho().total_cmp(&b.rho()));
    verticals.sort_by(|a, b| a.rho().total_cmp(&b.rho()));
    debug!(
        horizontal = horizontals.len(),
        vertical = verticals.len(),
        dropped,
        "Lines classified"
    );

    CardinalLines {
        horizontals,
        verticals,
    }
}
