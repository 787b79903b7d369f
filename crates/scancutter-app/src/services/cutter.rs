// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cutter service — detection reports and batch extraction.
//
// Detection and decoding are CPU-bound and run on the blocking pool. Each
// photo of a scan is then extracted and saved by its own blocking task, all
// sharing the decoded source through an `Arc`. The scan is marked done only
// once every task has joined successfully; nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use scancutter_core::error::{CutterError, Result};
use scancutter_core::{AppConfig, Color, OutputFormat, PREFIX_CROPPING, PREFIX_DONE};
use scancutter_detect::image::processor;
use scancutter_detect::{ImageContext, Quad, draw_lines, draw_quads, extract_quad};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tracing::{error, info, instrument, warn};

use super::files;

/// Colour of the cardinal lines on a review overlay.
const LINE_COLOR: Color = Color([255, 0, 0]);

// -- Detection reports --------------------------------------------------------

/// Coordinate space quads are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinates {
    /// The downscaled working copy detection ran on.
    Detection,
    /// The full-resolution scan.
    Original,
}

/// Quads found on one scan, as written to (and read back from) JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub file: PathBuf,
    /// `working_width / original_width`.
    pub ratio: f64,
    pub coordinates: Coordinates,
    pub quads: Vec<Quad>,
}

impl DetectionReport {
    /// The quads in original-scan coordinates.
    pub fn original_quads(&self) -> Vec<Quad> {
        match self.coordinates {
            Coordinates::Original => self.quads.clone(),
            Coordinates::Detection => self.quads.iter().map(|q| q.scale(1.0 / self.ratio)).collect(),
        }
    }

    /// Read a report written by the `detect` command.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Detect the photos on `path`, optionally writing a review overlay.
#[instrument(skip_all, fields(path = %path.display(), ?coordinates))]
pub async fn detect_file(
    path: PathBuf,
    config: Arc<AppConfig>,
    coordinates: Coordinates,
    overlay: Option<PathBuf>,
) -> Result<DetectionReport> {
    run_blocking(move || {
        let context = ImageContext::open(&path, &config.detection)?;

        if let (Some(overlay), Some(gray), Some(outline)) =
            (&overlay, context.working_gray(), context.outline())
        {
            let mut canvas = image::DynamicImage::ImageLuma8(gray.clone()).to_rgba8();
            draw_lines(&mut canvas, outline.lines.iter(), LINE_COLOR);
            draw_quads(&mut canvas, context.quads());
            processor::save(&canvas, overlay, OutputFormat::Png)?;
            info!(overlay = %overlay.display(), "Overlay written");
        }

        let quads = match coordinates {
            Coordinates::Detection => context.quads().to_vec(),
            Coordinates::Original => context.quads_original(),
        };
        Ok(DetectionReport {
            file: path,
            ratio: context.ratio(),
            coordinates,
            quads,
        })
    })
    .await
}

// -- Extraction ---------------------------------------------------------------

/// What happened to one scan during a cut.
#[derive(Debug)]
pub enum CutOutcome {
    /// No photo was detected; the scan was left untouched.
    NothingToCrop,
    /// Every photo was saved and the scan renamed `done-`.
    Done { saved: Vec<PathBuf> },
    /// Some photos failed; the scan keeps its `cropping-` marker.
    Partial {
        saved: Vec<PathBuf>,
        failures: Vec<CutterError>,
    },
}

/// Detect (unless `quads` are given, in original coordinates) and extract
/// every photo of one scan.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn cut_file(
    path: PathBuf,
    config: Arc<AppConfig>,
    quads: Option<Vec<Quad>>,
) -> Result<CutOutcome> {
    let path = files::strip_cropping_prefix(&path)?;

    let (source, quads) = {
        let path = path.clone();
        let config = Arc::clone(&config);
        run_blocking(move || -> Result<(RgbaImage, Vec<Quad>)> {
            match quads {
                Some(quads) => Ok((processor::load(&path)?.to_rgba8(), quads)),
                None => {
                    let context = ImageContext::open(&path, &config.detection)?;
                    Ok((context.original_rgba(), context.quads_original()))
                }
            }
        })
        .await?
    };

    if quads.is_empty() {
        info!("Nothing to crop");
        return Ok(CutOutcome::NothingToCrop);
    }

    let cropping = files::with_prefix(&path, PREFIX_CROPPING)?;
    std::fs::rename(&path, &cropping).inspect_err(|err| {
        error!(error = %err, "Cannot mark the scan as cropping, aborting");
    })?;

    let dir = path.parent().unwrap_or(Path::new("."));
    let format = config.extraction.format;
    let targets = files::unused_names(dir, &config.extraction.file_prefix, format.extension(), quads.len());

    let source = Arc::new(source);
    let tasks: Vec<_> = quads
        .into_iter()
        .zip(targets)
        .map(|(quad, target)| {
            let source = Arc::clone(&source);
            let label = quad.label.clone();
            let task = tokio::task::spawn_blocking(move || cut_and_save(&source, &quad, &target, format));
            (label, task)
        })
        .collect();

    let mut saved = Vec::new();
    let mut failures = Vec::new();
    for (label, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(err) => Err(CutterError::Io(join_error(err))),
        };
        match result {
            Ok(target) => saved.push(target),
            Err(err) => {
                warn!(%label, error = %err, "Photo extraction failed");
                failures.push(CutterError::Extraction {
                    label,
                    reason: err.to_string(),
                });
            }
        }
    }

    if !failures.is_empty() {
        warn!(saved = saved.len(), failed = failures.len(), "Cropping incomplete");
        return Ok(CutOutcome::Partial { saved, failures });
    }

    let done = files::with_prefix(&path, PREFIX_DONE)?;
    std::fs::rename(&cropping, &done).inspect_err(|err| {
        error!(error = %err, done = %done.display(), "Cannot mark the scan as done");
    })?;
    info!(photos = saved.len(), "Finished cropping");
    Ok(CutOutcome::Done { saved })
}

fn cut_and_save(source: &RgbaImage, quad: &Quad, target: &Path, format: OutputFormat) -> Result<PathBuf> {
    let photo = extract_quad(source, quad)?;
    processor::save(&photo, target, format)?;
    info!(label = %quad.label, path = %target.display(), "Photo saved");
    Ok(target.to_path_buf())
}

// -- Batches ------------------------------------------------------------------

/// Per-scan results of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<(PathBuf, CutOutcome)>,
    /// Scans that could not be processed at all.
    pub errors: Vec<(PathBuf, CutterError)>,
}

impl BatchSummary {
    /// Whether any scan or photo failed.
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
            || self
                .outcomes
                .iter()
                .any(|(_, outcome)| matches!(outcome, CutOutcome::Partial { .. }))
    }
}

/// Cut every pending scan below `root`, one scan at a time. A scan that
/// fails is recorded and the batch moves on.
pub async fn cut_batch(root: &Path, config: Arc<AppConfig>) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for path in files::scan_images(root, &config.extraction.file_prefix) {
        match cut_file(path.clone(), Arc::clone(&config), None).await {
            Ok(outcome) => summary.outcomes.push((path, outcome)),
            Err(err) => {
                error!(path = %path.display(), error = %err, "Scan skipped");
                summary.errors.push((path, err));
            }
        }
    }
    summary
}

/// Detect every pending scan below `root`. Failed scans are returned
/// alongside the reports.
pub async fn detect_batch(
    root: &Path,
    config: Arc<AppConfig>,
    coordinates: Coordinates,
) -> (Vec<DetectionReport>, Vec<(PathBuf, CutterError)>) {
    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for path in files::scan_images(root, &config.extraction.file_prefix) {
        match detect_file(path.clone(), Arc::clone(&config), coordinates, None).await {
            Ok(report) => reports.push(report),
            Err(err) => {
                error!(path = %path.display(), error = %err, "Scan skipped");
                errors.push((path, err));
            }
        }
    }
    (reports, errors)
}

// -- Helpers ------------------------------------------------------------------

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| CutterError::Io(join_error(err)))?
}

fn join_error(err: JoinError) -> std::io::Error {
    std::io::Error::other(format!("worker task failed: {err}"))
}
