// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Band flocker: groups near-coincident parallel lines into flocks.

use scancutter_core::error::Result;

use crate::geometry::Line;

/// Adjacent same-orientation lines standing for one physical edge.
/// Never empty; lines keep the order they were flocked in.
#[derive(Debug, Clone, PartialEq)]
pub struct Flock {
    lines: Vec<Line>,
}

impl Flock {
    fn starting_with(line: Line) -> Self {
        Self { lines: vec![line] }
    }

    fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Flocks are built non-empty, so this is always false.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Line with the smallest `rho`.
    pub fn first(&self) -> &Line {
        &self.lines[0]
    }

    /// Line with the largest `rho`.
    pub fn last(&self) -> &Line {
        &self.lines[self.lines.len() - 1]
    }

    /// Vertical line lying furthest left at height `y`.
    pub fn leftmost_at(&self, y: f64) -> Result<&Line> {
        self.extreme_by(|line| line.x_at(y), |candidate, best| candidate < best)
    }

    /// Vertical line lying furthest right at height `y`.
    pub fn rightmost_at(&self, y: f64) -> Result<&Line> {
        self.extreme_by(|line| line.x_at(y), |candidate, best| candidate > best)
    }

    /// Horizontal line lying highest at abscissa `x`.
    pub fn topmost_at(&self, x: f64) -> Result<&Line> {
        self.extreme_by(|line| line.y_at(x), |candidate, best| candidate < best)
    }

    /// Horizontal line lying lowest at abscissa `x`.
    pub fn bottommost_at(&self, x: f64) -> Result<&Line> {
        self.extreme_by(|line| line.y_at(x), |candidate, best| candidate > best)
    }

    fn extreme_by(
        &self,
        eval: impl Fn(&Line) -> Result<f64>,
        better: impl Fn(f64, f64) -> bool,
    ) -> Result<&Line> {
        let mut best = (self.first(), eval(self.first())?);
        for line in &self.lines[1..] {
            let value = eval(line)?;
            if better(value, best.1) {
                best = (line, value);
            }
        }
        Ok(best.0)
    }
}

/// Split `lines` (sorted by ascending `rho`) into flocks.
///
/// A line joins the running flock while its gap to the previous line,
/// divided by `dimension`, stays below `spacing`; a wider gap starts a new
/// flock. Single-link and order-dependent by construction.
pub fn flock_lines(lines: &[Line], dimension: u32, spacing: f64) -> Vec<Flock> {
    let dimension = f64::from(dimension.max(1));
    let mut flocks = Vec::new();
    let mut iter = lines.iter();

    let Some(first) = iter.next() else {
        return flocks;
    };
    let mut working = Flock::starting_with(*first);
    let mut previous = first;

    for line in iter {
        let gap = (line.rho() - previous.rho()) / dimension;
        if gap < spacing {
            working.push(*line);
        } else {
            flocks.push(std::mem::replace(&mut working, Flock::starting_with(*line)));
        }
        previous = line;
    }
    flocks.push(working);
    flocks
}
