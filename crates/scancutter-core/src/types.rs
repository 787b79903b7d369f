// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by detection and the batch workflow.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Prefix of a scan whose photos have all been extracted.
pub const PREFIX_DONE: &str = "done-";
/// Prefix of a scan whose photos are being extracted.
pub const PREFIX_CROPPING: &str = "cropping-";
/// Default prefix of an extracted photo.
pub const PREFIX_QUAD: &str = "quadri-";

/// Scan file extensions picked up by the directory walk.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["bmp", "png", "jpg", "jpeg"];

/// Quarter-turn applied to a photo after de-skewing.
///
/// Angles follow image coordinates (y grows downwards), so a positive angle
/// turns the x axis towards the y axis: one clockwise quarter-turn is one
/// quadrant, one anticlockwise quarter-turn is three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Up,
    Clockwise,
    Down,
    Anticlockwise,
}

impl Rotation {
    /// Number of clockwise quarter-turns, in `0..=3`.
    pub fn quadrants(&self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Clockwise => 1,
            Self::Down => 2,
            Self::Anticlockwise => 3,
        }
    }

    /// Build from any number of clockwise quarter-turns (taken modulo 4).
    pub fn from_quadrants(quadrants: i32) -> Self {
        match quadrants.rem_euclid(4) {
            0 => Self::Up,
            1 => Self::Clockwise,
            2 => Self::Down,
            _ => Self::Anticlockwise,
        }
    }

    /// The rotation as an angle in radians.
    pub fn radians(&self) -> f64 {
        f64::from(self.quadrants()) * FRAC_PI_2
    }

    pub fn rotated_clockwise(self) -> Self {
        Self::from_quadrants(i32::from(self.quadrants()) + 1)
    }

    pub fn rotated_anticlockwise(self) -> Self {
        Self::from_quadrants(i32::from(self.quadrants()) - 1)
    }
}

/// Orientation correction of one photo: a continuous skew estimate combined
/// with a quarter-turn snap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Skew angle in radians, as measured on the scan.
    pub skew: f64,
    pub rotation: Rotation,
}

impl Orientation {
    pub fn new(skew: f64, rotation: Rotation) -> Self {
        Self { skew, rotation }
    }

    /// Total angle to rotate by: the skew plus the quarter-turns.
    pub fn total_angle(&self) -> f64 {
        self.skew + self.rotation.radians()
    }
}

/// RGB display colour of a quadrilateral outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

/// Colours cycled through when labelling detected photos.
pub const PALETTE: [Color; 10] = [
    Color([255, 255, 0]),   // yellow
    Color([0, 255, 0]),     // green
    Color([0, 0, 255]),     // blue
    Color([255, 0, 0]),     // red
    Color([128, 128, 128]), // gray
    Color([255, 200, 0]),   // orange
    Color([0, 255, 255]),   // cyan
    Color([255, 0, 255]),   // magenta
    Color([255, 175, 175]), // pink
    Color([0, 0, 0]),       // black
];

impl Color {
    /// Palette colour for the `index`-th quadrilateral.
    pub fn for_index(index: usize) -> Self {
        PALETTE[index % PALETTE.len()]
    }
}
