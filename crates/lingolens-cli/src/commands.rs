// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations: input decoding, pipeline invocation, result
// serialisation.

use std::path::Path;
#[cfg(feature = "ocr")]
use std::sync::Arc;

use lingolens_core::error::{LingolensError, Result};
use lingolens_core::{Detection, PipelineConfig, PipelineReport, TranslatedFragment};
use lingolens_engine::Annotator;
use lingolens_pipeline::{Pipeline, PipelineOutcome};
use serde::Serialize;
use tracing::{info, instrument};

use crate::ProcessArgs;

/// Load the configuration file, or fall back to the defaults.
///
/// Values are checked once, by whoever consumes the configuration.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Parse a JSON array of per-engine detection lists.
///
/// A payload that is not valid JSON of that shape is an input decoding
/// failure; malformed individual detections are left for the merger to drop.
pub fn parse_detections(raw: &str) -> Result<Vec<Vec<Detection>>> {
    serde_json::from_str(raw)
        .map_err(|err| LingolensError::InputDecode(format!("invalid detections payload: {err}")))
}

#[instrument(skip_all, fields(path = %path.display()))]
fn read_detections(path: &Path) -> Result<Vec<Vec<Detection>>> {
    let raw = std::fs::read_to_string(path)?;
    let lists = parse_detections(&raw)?;
    info!(engines = lists.len(), "detections loaded");
    Ok(lists)
}

#[cfg(feature = "ocr")]
async fn recognize(args: &ProcessArgs, image: &image::DynamicImage) -> Result<Vec<Vec<Detection>>> {
    use lingolens_engine::{OcrConfig, OcrsEngine, RecognitionEngine, run_engines};

    let configs: Vec<OcrConfig> = if args.model_dirs.is_empty() {
        vec![OcrConfig::default()]
    } else {
        args.model_dirs
            .iter()
            .enumerate()
            .map(|(i, dir)| OcrConfig::from_dir(format!("ocrs-{i}"), dir))
            .collect()
    };

    // An engine whose models fail to load contributes nothing, like one that
    // fails during recognition.
    let mut engines: Vec<Arc<dyn RecognitionEngine>> = Vec::new();
    for config in configs {
        let name = config.name.clone();
        match OcrsEngine::new(config) {
            Ok(engine) => engines.push(Arc::new(engine)),
            Err(err) => tracing::warn!(engine = %name, error = %err, "engine unavailable"),
        }
    }
    Ok(run_engines(&engines, Arc::new(image.clone())).await)
}

#[cfg(not(feature = "ocr"))]
async fn recognize(_args: &ProcessArgs, _image: &image::DynamicImage) -> Result<Vec<Vec<Detection>>> {
    Err(LingolensError::Config(
        "built without the `ocr` feature; pass --detections instead".into(),
    ))
}

#[derive(Serialize)]
struct ReportedOutput<'a> {
    fragments: &'a [TranslatedFragment],
    report: &'a PipelineReport,
}

/// Serialise the outcome: a bare fragment array, or fragments plus counters.
pub fn render_output(outcome: &PipelineOutcome, with_report: bool) -> Result<String> {
    let json = if with_report {
        serde_json::to_string_pretty(&ReportedOutput {
            fragments: &outcome.fragments,
            report: &outcome.report,
        })?
    } else {
        serde_json::to_string_pretty(&outcome.fragments)?
    };
    Ok(json)
}

/// `lingolens process`.
pub async fn process(args: ProcessArgs) -> Result<()> {
    let pipeline = Pipeline::from_config(load_config(args.config.as_deref())?)?;

    // Decode everything up front so input errors surface before any work.
    let image = args
        .image
        .as_deref()
        .map(lingolens_engine::load_image)
        .transpose()?;
    let annotator = match (&args.annotate, &args.font) {
        (Some(_), Some(font)) => Some(Annotator::with_font_file(font)?),
        (Some(_), None) => Some(Annotator::new()),
        (None, _) => None,
    };

    let lists = match (&args.detections, &image) {
        (Some(path), _) => read_detections(path)?,
        (None, Some(image)) => recognize(&args, image).await?,
        (None, None) => {
            return Err(LingolensError::Config(
                "either --detections or --image is required".into(),
            ));
        }
    };

    let outcome = pipeline.process_with_report(lists).await;

    if let (Some(annotator), Some(target), Some(image)) = (&annotator, &args.annotate, &image) {
        annotator.save(image, &outcome.fragments, target)?;
    }

    let json = render_output(&outcome, args.report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(path = %path.display(), fragments = outcome.fragments.len(), "results written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// `lingolens config`.
pub fn show_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    config.validate()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
