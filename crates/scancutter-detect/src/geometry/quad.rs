// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral selected for extraction.
//
// Two APIs on purpose: `translate`, `rotate` and `scale` derive new quads and
// are what the pipeline uses; `set_corners_from` mutates in place and is
// reserved for interactive editing.

use scancutter_core::error::{CutterError, Result};
use scancutter_core::types::{Color, Rotation};
use serde::{Deserialize, Serialize};

use super::{Boundary, Point, Rect, Segment};

/// Four corners, nominally top-left, top-right, bottom-right, bottom-left,
/// plus the quarter-turn to apply after de-skewing.
///
/// The corners must form a simple polygon in that order. Edits are not
/// re-validated; [`Quad::validate`] is checked before extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub label: String,
    pub corners: [Point; 4],
    #[serde(default)]
    pub rotation: Rotation,
    /// Outline colour; display only.
    pub color: Color,
}

impl Quad {
    pub fn new(label: impl Into<String>, corners: [Point; 4], color: Color) -> Self {
        Self::with_rotation(label, corners, color, Rotation::Up)
    }

    pub fn with_rotation(
        label: impl Into<String>,
        corners: [Point; 4],
        color: Color,
        rotation: Rotation,
    ) -> Self {
        Self {
            label: label.into(),
            corners,
            rotation,
            color,
        }
    }

    /// Axis-aligned quad spanning from `top_left` to `bottom_right`, the
    /// default shape of a manually added outline.
    pub fn axis_aligned(
        label: impl Into<String>,
        top_left: Point,
        bottom_right: Point,
        color: Color,
    ) -> Self {
        Self::new(
            label,
            [
                top_left,
                Point::new(bottom_right.x, top_left.y),
                bottom_right,
                Point::new(top_left.x, bottom_right.y),
            ],
            color,
        )
    }

    /// Quad over the corners of a detected boundary, in detection space.
    pub fn from_boundary(label: impl Into<String>, boundary: &Boundary, color: Color) -> Result<Self> {
        Ok(Self::new(label, boundary.corners()?, color))
    }

    // -- Derived copies -------------------------------------------------------

    /// A copy moved by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        self.map_corners(|p| p.translated(dx, dy), self.rotation)
    }

    /// A copy rotated about the origin by `angle` radians.
    ///
    /// With `with_quadrants`, the quad's own quarter-turns are added to the
    /// angle and the copy's rotation resets to [`Rotation::Up`].
    pub fn rotate(&self, angle: f64, with_quadrants: bool) -> Self {
        let (angle, rotation) = if with_quadrants {
            (angle + self.rotation.radians(), Rotation::Up)
        } else {
            (angle, self.rotation)
        };
        self.map_corners(|p| p.rotated(angle), rotation)
    }

    /// A copy with every coordinate multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self.map_corners(|p| p.scaled(factor), self.rotation)
    }

    fn map_corners(&self, f: impl Fn(&Point) -> Point, rotation: Rotation) -> Self {
        Self {
            label: self.label.clone(),
            corners: [
                f(&self.corners[0]),
                f(&self.corners[1]),
                f(&self.corners[2]),
                f(&self.corners[3]),
            ],
            rotation,
            color: self.color,
        }
    }

    // -- In-place edit ----------------------------------------------------------

    /// Overwrite the corners with those of `other`, keeping label, colour and
    /// rotation.
    pub fn set_corners_from(&mut self, other: &Quad) {
        self.corners = other.corners;
    }

    // -- Queries ----------------------------------------------------------------

    /// Sides in corner order, the last one closing back on `corners[0]`.
    pub fn segments(&self) -> [Segment; 4] {
        let [p0, p1, p2, p3] = self.corners;
        [
            Segment::new(p0, p1),
            Segment::new(p1, p2),
            Segment::new(p2, p3),
            Segment::new(p3, p0),
        ]
    }

    /// Direction of each side, see [`Segment::angle`].
    pub fn angles(&self) -> [f64; 4] {
        self.segments().map(|s| s.angle())
    }

    pub fn leftmost(&self) -> Point {
        self.extreme(|a, b| a.x < b.x)
    }

    pub fn rightmost(&self) -> Point {
        self.extreme(|a, b| a.x > b.x)
    }

    pub fn topmost(&self) -> Point {
        self.extreme(|a, b| a.y < b.y)
    }

    pub fn bottommost(&self) -> Point {
        self.extreme(|a, b| a.y > b.y)
    }

    fn extreme(&self, better: impl Fn(&Point, &Point) -> bool) -> Point {
        self.corners
            .iter()
            .skip(1)
            .fold(self.corners[0], |best, p| if better(p, &best) { *p } else { best })
    }

    /// Centre of the enclosing rectangle.
    pub fn center(&self) -> Point {
        let rect = self.enclosing_rect();
        Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
    }

    /// Axis-aligned rectangle around the corners.
    pub fn enclosing_rect(&self) -> Rect {
        Rect::enclosing(&self.corners)
    }

    /// Bounds of the enclosing rectangle once rotated by `angle` about its
    /// own top-left corner (plus the quad's quarter-turns if `with_quadrants`).
    /// The origin of the result is relative to that corner.
    pub fn enclosing_rect_rotated(&self, angle: f64, with_quadrants: bool) -> Rect {
        let rect = self.enclosing_rect();
        let angle = if with_quadrants {
            angle + self.rotation.radians()
        } else {
            angle
        };
        let rotated = [
            Point::new(0.0, 0.0),
            Point::new(rect.width, 0.0).rotated(angle),
            Point::new(rect.width, rect.height).rotated(angle),
            Point::new(0.0, rect.height).rotated(angle),
        ];
        Rect::enclosing(&rotated)
    }

    /// Unsigned area (shoelace formula).
    pub fn area(&self) -> f64 {
        let c = &self.corners;
        let twice: f64 = (0..4)
            .map(|i| {
                let j = (i + 1) % 4;
                c[i].x * c[j].y - c[j].x * c[i].y
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Whether no two non-adjacent sides cross.
    pub fn is_simple(&self) -> bool {
        let s = self.segments();
        !s[0].crosses(&s[2]) && !s[1].crosses(&s[3])
    }

    /// Check the extraction preconditions: simple and not flat.
    pub fn validate(&self) -> Result<()> {
        if !self.is_simple() {
            return Err(CutterError::InvalidQuad(format!(
                "{} is self-intersecting: {:?}",
                self.label, self.corners
            )));
        }
        if self.area() < 1.0 {
            return Err(CutterError::InvalidQuad(format!(
                "{} has no area: {:?}",
                self.label, self.corners
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::geometry::Line;

    fn rect_quad() -> Quad {
        Quad::axis_aligned(
            "test",
            Point::new(10.0, 20.0),
            Point::new(110.0, 70.0),
            Color::for_index(0),
        )
    }

    fn assert_corners_close(a: &Quad, b: &Quad) {
        for (p, q) in a.corners.iter().zip(&b.corners) {
            assert!(
                (p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9,
                "{p:?} != {q:?}"
            );
        }
    }

    #[test]
    fn translate_round_trip_is_exact() {
        let quad = Quad::new(
            "odd",
            [
                Point::new(1.25, 2.5),
                Point::new(90.75, 3.0),
                Point::new(88.0, 61.5),
                Point::new(0.5, 60.0),
            ],
            Color::for_index(3),
        );
        let back = quad.translate(13.5, -7.25).translate(-13.5, 7.25);
        assert_eq!(back.corners, quad.corners);
    }

    #[test]
    fn rotate_then_unrotate_restores_corners() {
        let quad = rect_quad();
        let back = quad.rotate(0.37, false).rotate(-0.37, false);
        assert_corners_close(&back, &quad);
    }

    #[test]
    fn translation_does_not_touch_the_source() {
        let quad = rect_quad();
        let before = quad.clone();
        let _moved = quad.translate(5.0, 5.0);
        assert_eq!(quad, before);
    }

    #[test]
    fn rotate_with_quadrants_consumes_the_rotation() {
        let mut quad = rect_quad();
        quad.rotation = Rotation::Clockwise;
        let turned = quad.rotate(0.0, true);
        assert_eq!(turned.rotation, Rotation::Up);
        // (10, 20) turned a quarter clockwise lands on (-20, 10).
        assert!((turned.corners[0].x + 20.0).abs() < 1e-9);
        assert!((turned.corners[0].y - 10.0).abs() < 1e-9);

        let kept = quad.rotate(0.0, false);
        assert_eq!(kept.rotation, Rotation::Clockwise);
    }

    #[test]
    fn enclosing_rect_without_rotation() {
        let rect = rect_quad().enclosing_rect();
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 50.0));
    }

    #[test]
    fn enclosing_rect_rotated_by_quadrant_swaps_extent() {
        let mut quad = rect_quad();
        quad.rotation = Rotation::Clockwise;
        let rect = quad.enclosing_rect_rotated(0.0, true);
        assert!((rect.width - 50.0).abs() < 1e-9);
        assert!((rect.height - 100.0).abs() < 1e-9);

        let diagonal = rect_quad().enclosing_rect_rotated(PI / 4.0, false);
        let expected = 150.0 / 2f64.sqrt();
        assert!((diagonal.width - expected).abs() < 1e-9);
        assert!((diagonal.height - expected).abs() < 1e-9);
    }

    #[test]
    fn extremes_and_center() {
        let quad = Quad::new(
            "diamond",
            [
                Point::new(50.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
                Point::new(0.0, 50.0),
            ],
            Color::for_index(1),
        );
        assert_eq!(quad.leftmost(), Point::new(0.0, 50.0));
        assert_eq!(quad.rightmost(), Point::new(100.0, 50.0));
        assert_eq!(quad.topmost(), Point::new(50.0, 0.0));
        assert_eq!(quad.bottommost(), Point::new(50.0, 100.0));
        assert_eq!(quad.center(), Point::new(50.0, 50.0));
        assert!((quad.area() - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn twisted_quad_fails_validation() {
        let mut quad = rect_quad();
        quad.corners.swap(1, 2);
        assert!(!quad.is_simple());
        assert!(matches!(quad.validate(), Err(CutterError::InvalidQuad(_))));
        assert!(rect_quad().validate().is_ok());
    }

    #[test]
    fn flat_quad_fails_validation() {
        let quad = Quad::axis_aligned("flat", Point::new(0.0, 0.0), Point::new(50.0, 0.0), Color::for_index(0));
        assert!(quad.validate().is_err());
    }

    #[test]
    fn set_corners_from_keeps_identity() {
        let mut quad = rect_quad();
        quad.rotation = Rotation::Down;
        let other = rect_quad().translate(3.0, 4.0);
        quad.set_corners_from(&other);
        assert_eq!(quad.corners, other.corners);
        assert_eq!(quad.rotation, Rotation::Down);
        assert_eq!(quad.label, "test");
    }

    #[test]
    fn built_from_boundary_corners() {
        let boundary = Boundary::new(
            Line::new(20.0, FRAC_PI_2),
            Line::new(70.0, FRAC_PI_2),
            Line::new(10.0, 0.0),
            Line::new(110.0, 0.0),
            1.0,
        );
        let quad = Quad::from_boundary("test", &boundary, Color::for_index(0)).expect("quad");
        assert_corners_close(&quad, &rect_quad());
    }

    #[test]
    fn scale_maps_to_original_space() {
        let quad = rect_quad().scale(2.0);
        assert_eq!(quad.corners[2], Point::new(220.0, 140.0));
    }

    #[test]
    fn serializes_to_json() {
        let quad = rect_quad();
        let json = serde_json::to_string(&quad).expect("serialize");
        let back: Quad = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, quad);
    }
}
