// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lingolens: multi-engine OCR post-processing and translation.
//
// Entry point. Initialises logging, parses the command line and runs the
// selected command.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use lingolens_core::{ErrorClass, classify_error};

#[derive(Parser)]
#[command(name = "lingolens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Merge, order and translate text detections from several OCR engines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline on one image or on pre-computed detections
    Process(ProcessArgs),
    /// Print the effective configuration as JSON after validating it
    Config {
        /// Pipeline configuration file (JSON)
        #[arg(long, env = "LINGOLENS_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Per-engine detection lists (JSON array of arrays)
    #[arg(long, required_unless_present = "image")]
    pub detections: Option<PathBuf>,

    /// Source image. Recognised with the `ocrs` engines when no detections
    /// are given (requires the `ocr` feature), and used for `--annotate`.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Directory holding one engine's `ocrs` models; repeat per engine
    #[arg(long = "model-dir", env = "LINGOLENS_MODEL_DIR")]
    pub model_dirs: Vec<PathBuf>,

    /// Pipeline configuration file (JSON)
    #[arg(long, env = "LINGOLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write results here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write a copy of the image with fragment boxes drawn on it
    #[arg(long, requires = "image")]
    pub annotate: Option<PathBuf>,

    /// TrueType font for the text drawn by `--annotate` (default: a system font)
    #[arg(long, requires = "annotate", env = "LINGOLENS_FONT")]
    pub font: Option<PathBuf>,

    /// Wrap the fragments together with the per-request counters
    #[arg(long)]
    pub report: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Process(args) => commands::process(args).await,
        Commands::Config { config } => commands::show_config(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let class = classify_error(&err);
            tracing::error!(error = %err, ?class, "lingolens failed");
            eprintln!("error: {err}");
            match class {
                ErrorClass::Fatal => ExitCode::from(1),
                ErrorClass::Recovered => ExitCode::from(2),
            }
        }
    }
}
