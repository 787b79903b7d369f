// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scancutter.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Scancutter operations.
///
/// Finding no photograph on a scan is not an error: detection simply returns
/// an empty list and the caller decides what to do with it.
#[derive(Debug, Error)]
pub enum CutterError {
    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid quadrilateral: {0}")]
    InvalidQuad(String),

    // -- Images --
    #[error("failed to load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    #[error("failed to save image {}: {reason}", path.display())]
    ImageSave { path: PathBuf, reason: String },

    #[error("extraction of {label} failed: {reason}")]
    Extraction { label: String, reason: String },

    // -- Configuration --
    #[error("invalid detection parameters: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CutterError>;
