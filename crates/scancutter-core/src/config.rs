// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection, extraction and application configuration.

use std::f64::consts::{FRAC_PI_2, PI};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CutterError, Result};

/// Tunable parameters consumed by every stage of photo detection.
///
/// Defaults are tuned for 300-600 dpi flatbed scans of prints laid out with
/// a few millimetres between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Largest width or height of the downscaled working copy.
    pub working_dimension: u32,
    /// Canny low hysteresis threshold.
    pub canny_low: f32,
    /// High threshold as a multiple of the low one. Canny recommends 3, a
    /// higher ratio keeps photo borders while dropping picture content.
    pub canny_ratio: f32,
    /// Hough angle resolution, in radians. Rounded so a whole number of
    /// steps spans a half turn.
    pub line_angle_step: f64,
    /// Minimum Hough accumulator votes for a line to be reported.
    pub line_vote_threshold: u32,
    /// Non-maximum suppression radius in the Hough accumulator: pixels
    /// along the distance axis, degrees along the angle axis.
    pub line_suppression_radius: u32,
    /// Angle tolerance (radians) for a line to count as horizontal or vertical.
    pub cardinal_tolerance: f64,
    /// Relative gap (fraction of the image dimension) under which two
    /// consecutive lines belong to the same flock.
    pub flock_spacing: f64,
    /// A candidate line needs at least `dimension / pixel_threshold_ratio`
    /// lit edge pixels, `dimension` being the image extent along the line.
    pub pixel_threshold_ratio: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            working_dimension: 3000,
            canny_low: 40.0,
            canny_ratio: 6.0,
            line_angle_step: PI / (180.0 * 5.0),
            line_vote_threshold: 300,
            line_suppression_radius: 1,
            cardinal_tolerance: (0.75f64).to_radians(),
            flock_spacing: 0.01,
            pixel_threshold_ratio: 10,
        }
    }
}

impl DetectionParams {
    /// Canny high hysteresis threshold.
    pub fn canny_high(&self) -> f32 {
        self.canny_low * self.canny_ratio
    }

    /// Reject parameter sets that cannot produce a meaningful detection.
    pub fn validate(&self) -> Result<()> {
        if self.working_dimension == 0 {
            return Err(CutterError::Config("working_dimension must be positive".into()));
        }
        if !(self.canny_low > 0.0) || !(self.canny_ratio >= 1.0) {
            return Err(CutterError::Config(format!(
                "canny thresholds out of range: low={}, ratio={}",
                self.canny_low, self.canny_ratio
            )));
        }
        if !(self.line_angle_step > 0.0) {
            return Err(CutterError::Config("line_angle_step must be positive".into()));
        }
        if !(self.cardinal_tolerance > 0.0 && self.cardinal_tolerance < FRAC_PI_2) {
            return Err(CutterError::Config(format!(
                "cardinal_tolerance must lie in (0, pi/2), got {}",
                self.cardinal_tolerance
            )));
        }
        if !(self.flock_spacing > 0.0) {
            return Err(CutterError::Config("flock_spacing must be positive".into()));
        }
        if self.pixel_threshold_ratio == 0 {
            return Err(CutterError::Config("pixel_threshold_ratio must be positive".into()));
        }
        Ok(())
    }
}

/// Encoding used when writing extracted photographs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, keeps the transparent margins of skewed photos.
    Png,
    /// Lossy; transparency is flattened onto white.
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// Parameters for writing extracted photographs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionParams {
    pub format: OutputFormat,
    /// File name prefix of extracted photos, followed by a two-digit counter.
    pub file_prefix: String,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            file_prefix: crate::types::PREFIX_QUAD.to_string(),
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionParams,
    pub extraction: ExtractionParams,
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.detection.validate()?;
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = DetectionParams::default();
        assert!(params.validate().is_ok());
        assert!((params.canny_high() - 240.0).abs() < 1e-4);
    }

    #[test]
    fn zero_tolerance_is_rejected() {
        let params = DetectionParams {
            cardinal_tolerance: 0.0,
            ..DetectionParams::default()
        };
        assert!(matches!(params.validate(), Err(CutterError::Config(_))));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "detection": { "line_vote_threshold": 120 } }"#)
                .expect("valid json");
        assert_eq!(config.detection.line_vote_threshold, 120);
        assert_eq!(config.detection.working_dimension, 3000);
        assert_eq!(config.extraction.format, OutputFormat::Png);
    }

    #[test]
    fn jpeg_format_round_trips_through_json() {
        let config = AppConfig {
            extraction: ExtractionParams {
                format: OutputFormat::Jpeg { quality: 90 },
                ..ExtractionParams::default()
            },
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: AppConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
        assert_eq!(back.extraction.format.extension(), "jpg");
    }
}
