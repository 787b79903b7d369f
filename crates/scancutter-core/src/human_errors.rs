// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// The batch summary shows these instead of the raw error chain. Severity
// tells the operator whether re-running can help.

use crate::error::CutterError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operator must change something (parameters, a quad, disk space).
    ActionRequired,
    /// Re-running will fail the same way.
    Permanent,
}

/// A plain message with a suggestion of what to try next.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Describe an error for the end-of-run summary.
pub fn humanize_error(err: &CutterError) -> HumanError {
    match err {
        CutterError::DegenerateGeometry(detail) => HumanError {
            message: "Two edges of a photo never meet.".into(),
            suggestion: format!(
                "This usually means a detected outline collapsed; adjust the outline by hand. ({detail})"
            ),
            severity: Severity::Permanent,
        },
        CutterError::InvalidQuad(detail) => HumanError {
            message: "A photo outline is twisted or empty.".into(),
            suggestion: format!(
                "List the corners clockwise from the top-left one and try again. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },
        CutterError::ImageLoad { path, .. } => HumanError {
            message: format!("Could not read {}.", path.display()),
            suggestion: "The file may be damaged or in an unsupported format. Re-save it as PNG.".into(),
            severity: Severity::Permanent,
        },
        CutterError::ImageSave { path, .. } => HumanError {
            message: format!("Could not write {}.", path.display()),
            suggestion: "Check free disk space and write permissions on the folder.".into(),
            severity: Severity::ActionRequired,
        },
        CutterError::Extraction { label, reason } => HumanError {
            message: format!("Photo {label} was not extracted."),
            suggestion: format!(
                "The scan was left with its 'cropping-' prefix; run again once fixed. ({reason})"
            ),
            severity: Severity::ActionRequired,
        },
        CutterError::Config(detail) => HumanError {
            message: "The detection settings are not usable.".into(),
            suggestion: format!("Fix the configuration file. ({detail})"),
            severity: Severity::ActionRequired,
        },
        CutterError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file disappeared while it was being processed.".into(),
                suggestion: "Make sure nothing else is moving files in the scan folder.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied.".into(),
                suggestion: "Check that the scan folder is writable.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "A file operation failed.".into(),
                suggestion: format!("{io_err}"),
                severity: Severity::Permanent,
            },
        },
        CutterError::Serialization(err) => HumanError {
            message: "A JSON file could not be read.".into(),
            suggestion: format!("Check the file syntax near line {}.", err.line()),
            severity: Severity::ActionRequired,
        },
    }
}

/// Message for a scan on which no photo was found. Not an error, but the
/// operator still has a decision to make.
pub fn nothing_detected(file_name: &str) -> HumanError {
    HumanError {
        message: format!("No photo found on {file_name}."),
        suggestion: "Accept that there is nothing to cut, or lower the line vote threshold and retry.".into(),
        severity: Severity::ActionRequired,
    }
}
