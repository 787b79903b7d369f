// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image context — one source image for the duration of its analysis.
//
// Holds the original raster, a downscaled working copy and the edge map of
// that copy. Re-running detection with new parameters reuses whatever is
// still valid: the working copy while `working_dimension` is unchanged, the
// edge map while the Canny thresholds are unchanged as well.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbaImage};
use scancutter_core::error::Result;
use scancutter_core::{Color, DetectionParams};
use tracing::{debug, info, instrument};

use super::assembler::RectangleAssembler;
use super::cardinal::{CardinalLines, filter_cardinal};
use super::detector::{EdgeMap, HoughDetector, LineDetector};
use crate::geometry::{Boundary, Point, Quad};
use crate::image::processor;

/// Everything one detection run found, in detection coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub width: u32,
    pub height: u32,
    /// `working_width / original_width`.
    pub ratio: f64,
    pub edge_pixels: usize,
    /// Lines reported by the detector before the cardinal filter.
    pub raw_line_count: usize,
    pub lines: CardinalLines,
    pub boundaries: Vec<Boundary>,
}

struct WorkingCopy {
    dimension: u32,
    gray: GrayImage,
    ratio: f64,
}

struct CachedEdges {
    low: u32,
    high: u32,
    edges: EdgeMap,
}

/// Analysis state for one image.
pub struct ImageContext<D = HoughDetector> {
    original: DynamicImage,
    detector: D,
    working: Option<WorkingCopy>,
    edges: Option<CachedEdges>,
    outline: Option<Outline>,
    quads: Vec<Quad>,
}

impl ImageContext<HoughDetector> {
    /// Load `path` and run a first detection.
    #[instrument(skip(params), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, params: &DetectionParams) -> Result<Self> {
        let image = processor::load(path.as_ref())?;
        Self::from_image(image, params)
    }

    /// Wrap an already-decoded image and run a first detection.
    pub fn from_image(image: DynamicImage, params: &DetectionParams) -> Result<Self> {
        Self::with_detector(image, HoughDetector, params)
    }
}

impl<D: LineDetector> ImageContext<D> {
    /// Same as [`ImageContext::from_image`] with a custom line detector.
    pub fn with_detector(image: DynamicImage, detector: D, params: &DetectionParams) -> Result<Self> {
        let mut context = Self {
            original: image,
            detector,
            working: None,
            edges: None,
            outline: None,
            quads: Vec::new(),
        };
        context.detect(params)?;
        Ok(context)
    }

    // -- Detection ------------------------------------------------------------

    /// Run the detection pipeline, replacing the current quads with one
    /// `Detect N` quad per boundary found.
    #[instrument(skip_all)]
    pub fn detect(&mut self, params: &DetectionParams) -> Result<&Outline> {
        params.validate()?;

        let working = match &mut self.working {
            Some(working) if working.dimension == params.working_dimension => working,
            slot => {
                self.edges = None;
                slot.insert(working_copy(&self.original, params.working_dimension))
            }
        };

        let (low, high) = (params.canny_low.to_bits(), params.canny_high().to_bits());
        let edges = match &mut self.edges {
            Some(cached) if cached.low == low && cached.high == high => {
                debug!("Reusing cached edge map");
                &cached.edges
            }
            slot => {
                let edges = self.detector.edges(&working.gray, params);
                &slot.insert(CachedEdges { low, high, edges }).edges
            }
        };

        let raw = self.detector.lines(edges, params);
        let lines = filter_cardinal(&raw, params.cardinal_tolerance);
        let boundaries = RectangleAssembler::new(edges, params, working.ratio).assemble(&lines)?;

        let mut quads = Vec::with_capacity(boundaries.len());
        for (i, boundary) in boundaries.iter().enumerate() {
            quads.push(Quad::from_boundary(
                format!("Detect {}", i + 1),
                boundary,
                Color::for_index(i),
            )?);
        }
        info!(
            raw_lines = raw.len(),
            horizontals = lines.horizontals.len(),
            verticals = lines.verticals.len(),
            quads = quads.len(),
            "Detection complete"
        );

        let outline = Outline {
            width: working.gray.width(),
            height: working.gray.height(),
            ratio: working.ratio,
            edge_pixels: edges.lit_count(),
            raw_line_count: raw.len(),
            lines,
            boundaries,
        };
        self.quads = quads;
        Ok(self.outline.insert(outline))
    }

    // -- Accessors ------------------------------------------------------------

    pub fn original(&self) -> &DynamicImage {
        &self.original
    }

    /// Original raster as RGBA, the input of extraction.
    pub fn original_rgba(&self) -> RgbaImage {
        self.original.to_rgba8()
    }

    /// Grayscale working copy detection runs on.
    pub fn working_gray(&self) -> Option<&GrayImage> {
        self.working.as_ref().map(|w| &w.gray)
    }

    pub fn edges(&self) -> Option<&EdgeMap> {
        self.edges.as_ref().map(|e| &e.edges)
    }

    /// Result of the latest detection.
    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    /// `working_width / original_width`, 1 when no downscale was needed.
    pub fn ratio(&self) -> f64 {
        self.working.as_ref().map_or(1.0, |w| w.ratio)
    }

    // -- Quads ----------------------------------------------------------------

    /// Current quads, in detection coordinates.
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn quads_mut(&mut self) -> &mut Vec<Quad> {
        &mut self.quads
    }

    pub fn add_quad(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// Add the default manual outline: the middle third of the working copy.
    pub fn add_manual_quad(&mut self) -> &Quad {
        let (width, height) = self
            .working
            .as_ref()
            .map_or((self.original.width(), self.original.height()), |w| {
                (w.gray.width(), w.gray.height())
            });
        let (x1, y1) = (f64::from(width) / 3.0, f64::from(height) / 3.0);
        let quad = Quad::axis_aligned(
            format!("Manual {}", self.quads.len() + 1),
            Point::new(x1, y1),
            Point::new(x1 * 2.0, y1 * 2.0),
            self.next_color(),
        );
        self.quads.push(quad);
        &self.quads[self.quads.len() - 1]
    }

    /// Remove the quad at `index`, if any.
    pub fn remove_quad(&mut self, index: usize) -> Option<Quad> {
        (index < self.quads.len()).then(|| self.quads.remove(index))
    }

    /// Palette colour for the next quad added.
    pub fn next_color(&self) -> Color {
        Color::for_index(self.quads.len())
    }

    // -- Coordinate spaces ------------------------------------------------------

    /// A detection-space length in original pixels.
    pub fn to_original_scale(&self, d: f64) -> f64 {
        d / self.ratio()
    }

    /// A copy of `quad` in original-image coordinates.
    pub fn to_original(&self, quad: &Quad) -> Quad {
        quad.scale(1.0 / self.ratio())
    }

    /// Every current quad, in original-image coordinates.
    pub fn quads_original(&self) -> Vec<Quad> {
        self.quads.iter().map(|q| self.to_original(q)).collect()
    }
}

/// Grayscale copy of `original`, downscaled to fit `dimension` if larger.
fn working_copy(original: &DynamicImage, dimension: u32) -> WorkingCopy {
    let (width, height) = (original.width(), original.height());
    let scaled = if width.max(height) > dimension {
        original.resize(dimension, dimension, FilterType::Triangle)
    } else {
        original.clone()
    };
    let ratio = f64::from(scaled.width()) / f64::from(width.max(1));
    debug!(
        width = scaled.width(),
        height = scaled.height(),
        ratio,
        "Working copy prepared"
    );
    WorkingCopy {
        dimension,
        gray: scaled.to_luma8(),
        ratio,
    }
}
