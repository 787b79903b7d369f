// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hough accumulator with a configurable angle step.
//
// Normals span [0, π) in equal steps and distances are rounded to whole
// pixels within the image diagonal. A line just below π is the same line
// as one just above 0 with its distance negated, so peak suppression wraps
// across that seam.

use std::cmp::Reverse;
use std::f64::consts::PI;

use super::detector::{EdgeMap, RawLine};

/// Votes per (angle step, rounded distance) cell.
pub struct HoughAccumulator {
    step: f64,
    thetas: usize,
    max_rho: i64,
    votes: Vec<u32>,
}

impl HoughAccumulator {
    /// Let every lit pixel of `edges` vote for all lines through it.
    ///
    /// `angle_step` is adjusted so a whole number of steps spans π; at least
    /// one step is always used.
    pub fn vote(edges: &EdgeMap, angle_step: f64) -> Self {
        let thetas = ((PI / angle_step).round() as usize).max(1);
        let step = PI / thetas as f64;
        let max_rho = f64::from(edges.width())
            .hypot(f64::from(edges.height()))
            .ceil() as i64;
        let rhos = (2 * max_rho + 1) as usize;

        let table: Vec<(f64, f64)> = (0..thetas).map(|t| (t as f64 * step).sin_cos()).collect();
        let mut votes = vec![0u32; thetas * rhos];
        for (x, y) in edges.lit_pixels() {
            let (x, y) = (f64::from(x), f64::from(y));
            for (t, &(sin, cos)) in table.iter().enumerate() {
                let r = (x * cos + y * sin).round() as i64 + max_rho;
                votes[t * rhos + r as usize] += 1;
            }
        }

        Self {
            step,
            thetas,
            max_rho,
            votes,
        }
    }

    /// Effective angle step in radians.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Votes for the line with normal `theta_index × step` at distance `rho`.
    /// Zero outside the accumulator.
    pub fn votes(&self, theta_index: usize, rho: i64) -> u32 {
        let r = rho + self.max_rho;
        if theta_index >= self.thetas || !(0..self.rhos()).contains(&r) {
            return 0;
        }
        self.cell(theta_index as i64, r)
    }

    /// Cells holding at least `threshold` votes that beat every neighbour
    /// within `rho_radius` pixels and `theta_radius` steps.
    ///
    /// Equal neighbours are settled towards the angle nearest an image
    /// axis, then the larger angle index, then the larger distance, so a
    /// plateau yields exactly one line.
    pub fn peaks(&self, threshold: u32, rho_radius: i64, theta_radius: i64) -> Vec<RawLine> {
        let theta_radius = theta_radius.clamp(0, self.thetas as i64 / 2);
        let rho_radius = rho_radius.max(0);
        let mut peaks = Vec::new();
        for t in 0..self.thetas as i64 {
            for r in 0..self.rhos() {
                let votes = self.cell(t, r);
                if votes == 0 || votes < threshold {
                    continue;
                }
                if self.is_peak(t, r, votes, rho_radius, theta_radius) {
                    peaks.push(RawLine {
                        rho: (r - self.max_rho) as f64,
                        theta: t as f64 * self.step,
                    });
                }
            }
        }
        peaks
    }

    fn rhos(&self) -> i64 {
        2 * self.max_rho + 1
    }

    fn cell(&self, t: i64, r: i64) -> u32 {
        self.votes[(t * self.rhos() + r) as usize]
    }

    /// Tie-break order between cells with equal votes.
    fn priority(&self, t: i64, r: i64) -> (Reverse<i64>, i64, i64) {
        let thetas = self.thetas as i64;
        // In half steps, so π/2 needs no rounding for odd step counts.
        let off_axis = (2 * t).min(2 * (thetas - t)).min((2 * t - thetas).abs());
        (Reverse(off_axis), t, r)
    }

    fn is_peak(&self, t: i64, r: i64, votes: u32, rho_radius: i64, theta_radius: i64) -> bool {
        let thetas = self.thetas as i64;
        for dt in -theta_radius..=theta_radius {
            for dr in -rho_radius..=rho_radius {
                if dt == 0 && dr == 0 {
                    continue;
                }
                let (mut nt, mut nr) = (t + dt, r + dr);
                if !(0..thetas).contains(&nt) {
                    nt = nt.rem_euclid(thetas);
                    nr = 2 * self.max_rho - nr;
                }
                if !(0..self.rhos()).contains(&nr) {
                    continue;
                }
                let other = self.cell(nt, nr);
                if other > votes || (other == votes && self.priority(nt, nr) > self.priority(t, r)) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;

    fn column(width: u32, height: u32, x: u32, rows: std::ops::Range<u32>) -> EdgeMap {
        let mut gray = GrayImage::new(width, height);
        for y in rows {
            gray.put_pixel(x, y, Luma([255u8]));
        }
        EdgeMap::new(gray)
    }

    #[test]
    fn step_divides_the_half_turn() {
        let edges = column(10, 10, 5, 0..10);
        let accumulator = HoughAccumulator::vote(&edges, PI / 900.0);
        assert!((accumulator.step() - PI / 900.0).abs() < 1e-15);

        let coarse = HoughAccumulator::vote(&edges, 0.7 * PI);
        assert!((coarse.step() - PI).abs() < 1e-15);
    }

    #[test]
    fn every_pixel_votes_for_its_column() {
        let edges = column(100, 120, 30, 10..110);
        let accumulator = HoughAccumulator::vote(&edges, PI / 180.0);
        assert_eq!(accumulator.votes(0, 30), 100);
        assert_eq!(accumulator.votes(0, 31), 0);
        assert_eq!(accumulator.votes(0, 10_000), 0);
    }

    #[test]
    fn fine_step_keeps_a_single_peak_per_edge() {
        let edges = column(200, 200, 50, 50..150);
        let accumulator = HoughAccumulator::vote(&edges, PI / 900.0);
        let peaks = accumulator.peaks(60, 1, 5);
        assert_eq!(peaks, vec![RawLine { rho: 50.0, theta: 0.0 }]);
    }

    #[test]
    fn suppression_wraps_across_the_half_turn() {
        // Without the wrap, the cell just below π (distance -50) stands
        // alone at its end of the accumulator and would survive.
        let edges = column(200, 200, 50, 50..150);
        let accumulator = HoughAccumulator::vote(&edges, PI / 900.0);
        assert!(accumulator.votes(899, -50) >= 60);
        let peaks = accumulator.peaks(60, 1, 5);
        assert!(peaks.iter().all(|line| line.theta < 1.0), "{peaks:?}");
    }

    #[test]
    fn plateau_yields_one_line() {
        let mut gray = GrayImage::new(100, 100);
        for y in 10..90 {
            gray.put_pixel(40, y, Luma([255u8]));
            gray.put_pixel(41, y, Luma([255u8]));
        }
        let accumulator = HoughAccumulator::vote(&EdgeMap::new(gray), PI / 180.0);
        assert_eq!(accumulator.votes(0, 40), accumulator.votes(0, 41));
        let peaks = accumulator.peaks(50, 2, 1);
        assert_eq!(peaks, vec![RawLine { rho: 41.0, theta: 0.0 }]);
    }

    #[test]
    fn short_edge_prefers_the_axis_angle() {
        // Rows 1..=98 all round to the same distance at 0° and 0.2°.
        let edges = column(100, 100, 50, 1..99);
        let accumulator = HoughAccumulator::vote(&edges, PI / 900.0);
        assert_eq!(accumulator.votes(0, 50), accumulator.votes(1, 50));
        let peaks = accumulator.peaks(60, 1, 5);
        assert_eq!(peaks, vec![RawLine { rho: 50.0, theta: 0.0 }]);
    }

    #[test]
    fn threshold_filters_weak_cells() {
        let edges = column(100, 100, 20, 0..30);
        let accumulator = HoughAccumulator::vote(&edges, PI / 180.0);
        assert!(accumulator.peaks(31, 1, 1).is_empty());
        assert_eq!(accumulator.peaks(30, 1, 1).len(), 1);
    }
}
