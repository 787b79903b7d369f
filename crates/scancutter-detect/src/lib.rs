// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scancutter-detect — Photo detection and extraction for Scancutter.
//
// Finds the photographs laid out on a composite flatbed scan (edge map,
// Hough lines, cardinal filtering, flocking and rectangle assembly) and
// cuts each one out de-skewed and upright.

pub mod geometry;
pub mod image;
pub mod scan;

// Re-export the primary types so callers can use `scancutter_detect::ImageContext` etc.
pub use geometry::{Boundary, Line, Point, Quad, Rect, Segment};
pub use self::image::extract::{dominant_angle, extract_quad};
pub use self::image::overlay::{draw_lines, draw_quads};
pub use scan::context::{ImageContext, Outline};
pub use scan::detector::{EdgeMap, HoughDetector, LineDetector, RawLine};
