// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scancutter — find the photographs on composite flatbed scans and cut each
// one out, de-skewed and upright.
//
// Entry point. Initialises logging, loads the settings and dispatches the
// `detect` and `cut` commands.

mod services;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scancutter_core::AppConfig;
use scancutter_core::error::{CutterError, Result};
use scancutter_core::human_errors::{HumanError, humanize_error, nothing_detected};

use services::cutter::{self, BatchSummary, Coordinates, CutOutcome, DetectionReport};

#[derive(Parser)]
#[command(name = "scancutter")]
#[command(about = "Cut the photographs out of composite flatbed scans")]
#[command(version)]
struct Cli {
    /// Settings file (JSON). Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect photos and print (or write) their outlines as JSON.
    Detect {
        /// A scan, or a folder searched recursively.
        input: PathBuf,

        /// Write the JSON here instead of standard output.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Report corners in full-resolution coordinates.
        #[arg(long)]
        original: bool,

        /// Write a PNG of the working copy with lines and outlines drawn
        /// (single scan only).
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
    /// Detect and save every photo, renaming each scan `done-` when complete.
    Cut {
        /// A scan, or a folder searched recursively.
        input: PathBuf,

        /// Use the outlines from this JSON report instead of detecting
        /// (single scan only).
        #[arg(long)]
        quads: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Scancutter starting");

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(err) => {
            report(&humanize_error(&err));
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Detect {
            input,
            out,
            original,
            overlay,
        } => run_detect(&input, out.as_deref(), original, overlay, config).await,
        Commands::Cut { input, quads } => run_cut(&input, quads.as_deref(), config).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report(&humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let config = AppConfig::load(path)?;
            tracing::info!(path = %path.display(), "Settings loaded");
            Ok(config)
        }
        None => Ok(AppConfig::default()),
    }
}

/// Returns whether every scan was analysed.
async fn run_detect(
    input: &Path,
    out: Option<&Path>,
    original: bool,
    overlay: Option<PathBuf>,
    config: Arc<AppConfig>,
) -> Result<bool> {
    let coordinates = if original {
        Coordinates::Original
    } else {
        Coordinates::Detection
    };

    let (reports, errors) = if input.is_file() {
        let report = cutter::detect_file(input.to_path_buf(), config, coordinates, overlay).await?;
        (vec![report], Vec::new())
    } else {
        if overlay.is_some() {
            tracing::warn!("--overlay is ignored for folders");
        }
        cutter::detect_batch(input, config, coordinates).await
    };

    for report in reports.iter().filter(|r| r.quads.is_empty()) {
        report_nothing_detected(&report.file);
    }
    let json = if let [single] = reports.as_slice() {
        serde_json::to_string_pretty(single)?
    } else {
        serde_json::to_string_pretty(&reports)?
    };
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }

    for (path, err) in &errors {
        eprintln!("{}:", path.display());
        report(&humanize_error(err));
    }
    Ok(errors.is_empty())
}

/// Returns whether every photo of every scan was saved.
async fn run_cut(input: &Path, quads: Option<&Path>, config: Arc<AppConfig>) -> Result<bool> {
    let summary = if input.is_file() {
        let quads = quads
            .map(|path| DetectionReport::load(path).map(|r| r.original_quads()))
            .transpose()?;
        let mut summary = BatchSummary::default();
        match cutter::cut_file(input.to_path_buf(), config, quads).await {
            Ok(outcome) => summary.outcomes.push((input.to_path_buf(), outcome)),
            Err(err) => summary.errors.push((input.to_path_buf(), err)),
        }
        summary
    } else {
        if quads.is_some() {
            return Err(CutterError::Config("--quads needs a single scan, not a folder".into()));
        }
        cutter::cut_batch(input, config).await
    };

    print_summary(&summary);
    Ok(!summary.has_failures())
}

fn print_summary(summary: &BatchSummary) {
    let mut done = 0usize;
    let mut photos = 0usize;
    for (path, outcome) in &summary.outcomes {
        match outcome {
            CutOutcome::Done { saved } => {
                done += 1;
                photos += saved.len();
            }
            CutOutcome::NothingToCrop => report_nothing_detected(path),
            CutOutcome::Partial { saved, failures } => {
                photos += saved.len();
                eprintln!("{}:", path.display());
                for failure in failures {
                    report(&humanize_error(failure));
                }
            }
        }
    }
    for (path, err) in &summary.errors {
        eprintln!("{}:", path.display());
        report(&humanize_error(err));
    }
    println!(
        "{done} of {} scans done, {photos} photos saved",
        summary.outcomes.len() + summary.errors.len()
    );
}

fn report_nothing_detected(path: &Path) {
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    report(&nothing_detected(&name));
}

fn report(human: &HumanError) {
    eprintln!("  {}", human.message);
    eprintln!("  {}", human.suggestion);
}
