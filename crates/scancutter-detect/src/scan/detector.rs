// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge and line detection primitives. The pipeline only sees the
// `LineDetector` trait; `HoughDetector` backs it with imageproc's Canny and
// a Hough accumulator stepping at `line_angle_step`.

use image::{GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use scancutter_core::DetectionParams;
use tracing::{debug, instrument};

use super::hough::HoughAccumulator;

/// Binary edge raster: a pixel is either lit or not.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    pixels: GrayImage,
}

impl EdgeMap {
    /// Wrap a grayscale raster; any non-zero pixel counts as lit.
    pub fn new(pixels: GrayImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether `(x, y)` is inside the raster and lit.
    pub fn is_lit(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return false;
        }
        self.pixels.get_pixel(x as u32, y as u32).0[0] > 0
    }

    /// Number of lit pixels in the whole map.
    pub fn lit_count(&self) -> usize {
        self.pixels.pixels().filter(|p| p.0[0] > 0).count()
    }

    /// Coordinates of every lit pixel, row by row.
    pub fn lit_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pixels
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y))
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }
}

/// A line as reported by the detector: normal angle `theta` in radians and
/// signed distance `rho` from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLine {
    pub rho: f64,
    pub theta: f64,
}

/// Source of edge maps and infinite line candidates.
pub trait LineDetector {
    /// Binary edge map of a grayscale raster.
    fn edges(&self, gray: &GrayImage, params: &DetectionParams) -> EdgeMap;

    /// Infinite line candidates supported by the edge map.
    fn lines(&self, edges: &EdgeMap, params: &DetectionParams) -> Vec<RawLine>;
}

/// Canny edges thinned to one pixel, then a Hough transform at the
/// configured angle step.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoughDetector;

impl LineDetector for HoughDetector {
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    fn edges(&self, gray: &GrayImage, params: &DetectionParams) -> EdgeMap {
        let mut edges = canny(gray, params.canny_low, params.canny_high());
        let thinned = thin_double_edges(&mut edges, gray);
        debug!(
            low = params.canny_low,
            high = params.canny_high(),
            thinned,
            "Canny edge detection complete"
        );
        EdgeMap::new(edges)
    }

    #[instrument(skip_all, fields(vote_threshold = params.line_vote_threshold))]
    fn lines(&self, edges: &EdgeMap, params: &DetectionParams) -> Vec<RawLine> {
        let accumulator = HoughAccumulator::vote(edges, params.line_angle_step);
        // The radius counts pixels along rho and degrees along theta.
        let radius = params.line_suppression_radius;
        let theta_radius = (f64::from(radius).to_radians() / accumulator.step()).round() as i64;
        let lines = accumulator.peaks(params.line_vote_threshold, i64::from(radius), theta_radius);
        debug!(
            line_count = lines.len(),
            step_degrees = accumulator.step().to_degrees(),
            "Hough lines detected"
        );
        lines
    }
}

/// Canny keeps both pixels of a step that falls exactly between two
/// pixels. Of two lit pixels adjacent across the gradient, only the one
/// with the larger coordinate is kept. Returns the number cleared.
fn thin_double_edges(edges: &mut GrayImage, gray: &GrayImage) -> usize {
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let (width, height) = edges.dimensions();

    let mut cleared = Vec::new();
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        let across_columns =
            gx.get_pixel(x, y).0[0].unsigned_abs() >= gy.get_pixel(x, y).0[0].unsigned_abs();
        let (nx, ny) = if across_columns { (x + 1, y) } else { (x, y + 1) };
        if nx < width && ny < height && edges.get_pixel(nx, ny).0[0] > 0 {
            cleared.push((x, y));
        }
    }
    for &(x, y) in &cleared {
        edges.put_pixel(x, y, Luma([0u8]));
    }
    cleared.len()
}
