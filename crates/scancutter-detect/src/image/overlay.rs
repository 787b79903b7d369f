// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay rendering for visual review of a detection.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use scancutter_core::Color;

use crate::geometry::{Line, Quad, Segment};

/// Stroke width of quad outlines, in pixels.
const QUAD_STROKE: i32 = 3;

fn rgba(color: Color) -> Rgba<u8> {
    let [r, g, b] = color.0;
    Rgba([r, g, b, 255])
}

/// Stroke every side of every quad in its own colour.
pub fn draw_quads(image: &mut RgbaImage, quads: &[Quad]) {
    for quad in quads {
        let color = rgba(quad.color);
        for segment in quad.segments() {
            draw_thick_segment(image, &segment, color);
        }
    }
}

/// Draw each line across the whole image, one pixel wide.
pub fn draw_lines<'a>(image: &mut RgbaImage, lines: impl IntoIterator<Item = &'a Line>, color: Color) {
    let (width, height) = (f64::from(image.width()), f64::from(image.height()));
    let color = rgba(color);
    for line in lines {
        // Long enough to leave the image whatever the origin point.
        let (a, b) = (line.theta().cos(), line.theta().sin());
        let (x0, y0) = (line.x0(), line.y0());
        let reach = 2.0 * (width + height);
        let start = ((x0 - reach * b) as f32, (y0 + reach * a) as f32);
        let end = ((x0 + reach * b) as f32, (y0 - reach * a) as f32);
        draw_line_segment_mut(image, start, end, color);
    }
}

fn draw_thick_segment(image: &mut RgbaImage, segment: &Segment, color: Rgba<u8>) {
    let (p0, p1) = (segment.p0, segment.p1);
    let mostly_horizontal = (p1.x - p0.x).abs() >= (p1.y - p0.y).abs();
    let half = QUAD_STROKE / 2;
    for offset in -half..=half {
        let (dx, dy) = if mostly_horizontal {
            (0.0, offset as f32)
        } else {
            (offset as f32, 0.0)
        };
        draw_line_segment_mut(
            image,
            (p0.x as f32 + dx, p0.y as f32 + dy),
            (p1.x as f32 + dx, p1.y as f32 + dy),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::geometry::Point;

    #[test]
    fn quads_are_stroked_three_pixels_wide() {
        let mut image = RgbaImage::new(100, 100);
        let quad = Quad::axis_aligned("q", Point::new(20.0, 20.0), Point::new(80.0, 60.0), Color::for_index(2));
        draw_quads(&mut image, &[quad]);

        let blue = Rgba([0, 0, 255, 255]);
        for y in 19..=21 {
            assert_eq!(*image.get_pixel(50, y), blue, "top edge at y={y}");
        }
        assert_eq!(image.get_pixel(50, 23).0[3], 0);
        assert_eq!(*image.get_pixel(80, 40), blue);
        assert_eq!(image.get_pixel(50, 40).0[3], 0);
    }

    #[test]
    fn lines_span_the_whole_image() {
        let mut image = RgbaImage::new(40, 30);
        let lines = [Line::new(10.0, FRAC_PI_2), Line::new(25.0, 0.0)];
        draw_lines(&mut image, &lines, Color([255, 0, 0]));
        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(*image.get_pixel(0, 10), red);
        assert_eq!(*image.get_pixel(39, 10), red);
        assert_eq!(*image.get_pixel(25, 0), red);
        assert_eq!(*image.get_pixel(25, 29), red);
    }
}
