// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Infinite lines in Hough (polar) form.

use std::f64::consts::PI;
use std::fmt;

use scancutter_core::error::{CutterError, Result};
use serde::{Deserialize, Serialize};

use super::Point;

/// Below this determinant two lines are treated as parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// An infinite line `x·cos θ + y·sin θ = ρ`.
///
/// `theta` is the angle of the line's normal, so `θ = 0` is a vertical line
/// and `θ = π/2` a horizontal one. Image coordinates: y grows downwards.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    rho: f64,
    theta: f64,
}

impl Line {
    /// Build a line from detector output. `theta` is folded into `[0, π)`,
    /// flipping the sign of `rho` when it has to be moved by π.
    pub fn new(rho: f64, theta: f64) -> Self {
        let folded = theta.rem_euclid(2.0 * PI);
        if folded >= PI {
            Self {
                rho: -rho,
                theta: folded - PI,
            }
        } else {
            Self { rho, theta: folded }
        }
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// The point of the line closest to the origin.
    pub fn origin_point(&self) -> Point {
        Point::new(self.x0(), self.y0())
    }

    /// X coordinate of the point closest to the origin.
    pub fn x0(&self) -> f64 {
        self.rho * self.theta.cos()
    }

    /// Y coordinate of the point closest to the origin.
    pub fn y0(&self) -> f64 {
        self.rho * self.theta.sin()
    }

    /// X coordinate of the line at height `y`.
    ///
    /// Fails on an exactly horizontal line, which has no single `x`.
    pub fn x_at(&self, y: f64) -> Result<f64> {
        let cos = self.theta.cos();
        if cos.abs() < f64::EPSILON {
            return Err(CutterError::DegenerateGeometry(format!(
                "x requested on horizontal line {self:?}"
            )));
        }
        Ok(self.x0() + (self.y0() - y) * self.theta.tan())
    }

    /// Y coordinate of the line at abscissa `x`.
    ///
    /// Fails on an exactly vertical line, which has no single `y`.
    pub fn y_at(&self, x: f64) -> Result<f64> {
        let sin = self.theta.sin();
        if sin.abs() < f64::EPSILON {
            return Err(CutterError::DegenerateGeometry(format!(
                "y requested on vertical line {self:?}"
            )));
        }
        // cos/sin rather than 1/tan: tan(π/2) is not finite.
        Ok(self.y0() + (self.x0() - x) * self.theta.cos() / sin)
    }

    /// The unique point shared with `other`.
    ///
    /// Fails with `DegenerateGeometry` when the lines are parallel or
    /// identical. Symmetric: `a.intersect(&b) == b.intersect(&a)`.
    pub fn intersect(&self, other: &Line) -> Result<Point> {
        let (sin1, cos1) = self.theta.sin_cos();
        let (sin2, cos2) = other.theta.sin_cos();

        let det = cos1 * sin2 - sin1 * cos2;
        if det.abs() < PARALLEL_EPSILON {
            return Err(CutterError::DegenerateGeometry(format!(
                "lines {self:?} and {other:?} are parallel or identical"
            )));
        }

        // Cramer's rule. Swapping the operands negates both numerator and
        // determinant, so the result is bit-for-bit symmetric.
        let x = (self.rho * sin2 - other.rho * sin1) / det;
        let y = (other.rho * cos1 - self.rho * cos2) / det;
        Ok(Point::new(x, y))
    }

    /// Same line expressed in a coordinate space scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rho: self.rho * factor,
            theta: self.theta,
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line(rho={:.2}, theta={:.4}°)",
            self.rho,
            self.theta.to_degrees()
        )
    }
}
