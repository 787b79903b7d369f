// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad transform — cut one photograph out of a scan, de-skewed and turned
// upright.
//
// Two stages: a coarse crop of the quad's enclosing rectangle with
// everything outside the quad made transparent, then one rotation by the
// skew plus the quad's quarter-turns into a buffer sized to the rotated
// quad, which trims the transparent margins away.

use std::f64::consts::{FRAC_PI_2, PI};

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::point::Point as PixelPoint;
use scancutter_core::Orientation;
use scancutter_core::error::{CutterError, Result};
use tracing::{debug, instrument};

use crate::geometry::Quad;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Margin around the coarse crop so bicubic sampling near the border still
/// has a full 4x4 neighbourhood.
const SAMPLING_MARGIN: u32 = 4;

/// Skew of `quad` from axis-aligned, in radians.
///
/// Read from the bottom side when the directions of the top and bottom
/// differ more than those of the left and right, from the left side
/// otherwise. Raw differences are compared rather than their distance to π,
/// so this only approximates picking the more parallel pair. For a true
/// rectangle both differ by exactly π and the left side wins.
pub fn dominant_angle(quad: &Quad) -> f64 {
    let [a0, a1, a2, a3] = quad.angles();
    if (a0 - a2).abs() > (a1 - a3).abs() {
        a2 - PI
    } else {
        a3 - FRAC_PI_2
    }
}

/// Extract the photograph outlined by `quad` (in `source` coordinates).
#[instrument(skip_all, fields(label = %quad.label, rotation = ?quad.rotation))]
pub fn extract_quad(source: &RgbaImage, quad: &Quad) -> Result<RgbaImage> {
    quad.validate()?;

    let orientation = Orientation::new(dominant_angle(quad), quad.rotation);
    let rect = quad.enclosing_rect();
    let (x, y) = (rect.x.trunc() as i64, rect.y.trunc() as i64);
    let (width, height) = (rect.width as u32, rect.height as u32);
    if width == 0 || height == 0 {
        return Err(extraction_error(quad, "enclosing rectangle is empty"));
    }

    let mask = polygon_mask(quad, x, y, width, height)?;
    let coarse = masked_crop(source, &mask, x, y);

    // Final size: the quad, moved to the crop's origin and turned upright.
    let upright = quad.translate(-(x as f64), -(y as f64)).rotate(orientation.skew, true);
    let bounds = upright.enclosing_rect();
    let (out_width, out_height) = (bounds.width.round() as u32, bounds.height.round() as u32);
    if out_width == 0 || out_height == 0 {
        return Err(extraction_error(quad, "photo collapses after rotation"));
    }
    debug!(
        skew_degrees = orientation.skew.to_degrees(),
        crop_width = width,
        crop_height = height,
        out_width,
        out_height,
        "Extracting photo"
    );

    let margin = SAMPLING_MARGIN as f32;
    let projection = Projection::translate(-(bounds.x.round() as f32), -(bounds.y.round() as f32))
        * Projection::rotate(orientation.total_angle() as f32)
        * Projection::translate(-margin, -margin);

    let padded = clamp_padded(&coarse, SAMPLING_MARGIN);
    let mut out = RgbaImage::from_pixel(out_width, out_height, TRANSPARENT);
    warp_into(&padded, &projection, Interpolation::Bicubic, TRANSPARENT, &mut out);
    Ok(out)
}

/// Lit where the quad covers the `width x height` crop at `(x, y)`.
fn polygon_mask(quad: &Quad, x: i64, y: i64, width: u32, height: u32) -> Result<GrayImage> {
    let mut points: Vec<PixelPoint<i32>> = Vec::with_capacity(4);
    for corner in &quad.corners {
        let (px, py) = corner.translated(-(x as f64), -(y as f64)).rounded();
        let point = PixelPoint::new(px, py);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Err(extraction_error(quad, "fewer than three distinct pixel corners"));
    }

    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, &points, Luma([255u8]));
    Ok(mask)
}

/// Copy of the source region at `(x, y)` keeping only masked pixels.
fn masked_crop(source: &RgbaImage, mask: &GrayImage, x: i64, y: i64) -> RgbaImage {
    let (source_width, source_height) = (i64::from(source.width()), i64::from(source.height()));
    RgbaImage::from_fn(mask.width(), mask.height(), |cx, cy| {
        let (sx, sy) = (x + i64::from(cx), y + i64::from(cy));
        let inside = (0..source_width).contains(&sx) && (0..source_height).contains(&sy);
        if inside && mask.get_pixel(cx, cy).0[0] > 0 {
            *source.get_pixel(sx as u32, sy as u32)
        } else {
            TRANSPARENT
        }
    })
}

/// `image` grown by `margin` on every side, border pixels repeated.
fn clamp_padded(image: &RgbaImage, margin: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width + 2 * margin, height + 2 * margin, |px, py| {
        let x = px.saturating_sub(margin).min(width - 1);
        let y = py.saturating_sub(margin).min(height - 1);
        *image.get_pixel(x, y)
    })
}

fn extraction_error(quad: &Quad, reason: &str) -> CutterError {
    CutterError::Extraction {
        label: quad.label.clone(),
        reason: reason.to_string(),
    }
}
