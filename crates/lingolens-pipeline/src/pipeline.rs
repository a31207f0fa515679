// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestration: raw per-engine detections in, ordered translated
// fragments out.

use lingolens_core::error::Result;
use lingolens_core::{
    Detection, NormalizedFragment, PipelineConfig, PipelineReport, RequestId, TranslatedFragment,
};
use lingolens_translate::TranslationRouter;
use tracing::{Instrument, debug, info, info_span, instrument};

use crate::dedup::SpatialDeduplicator;
use crate::merge::DetectionMerger;
use crate::normalize::TextNormalizer;
use crate::order::ReadingOrderSorter;
use crate::script::classify_script;

/// Fragments plus the counters describing how they were produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub fragments: Vec<TranslatedFragment>,
    pub report: PipelineReport,
}

/// The composed detection post-processing pipeline.
///
/// Every component is derived from the configuration at construction time and
/// never written to afterwards, so one `Pipeline` can serve any number of
/// requests, concurrently, without one request influencing another.
///
/// # Example
///
/// ```rust,no_run
/// use lingolens_core::{BoundingBox, Detection, PipelineConfig};
/// use lingolens_pipeline::Pipeline;
///
/// # async fn run() -> lingolens_core::error::Result<()> {
/// let pipeline = Pipeline::from_config(PipelineConfig::default())?;
/// let latin = vec![Detection::new(BoundingBox::new(0.0, 0.0, 50.0, 20.0), "ARR?T", 0.9)];
/// let fragments = pipeline.process(vec![latin]).await;
/// assert_eq!(fragments[0].original, "ARRÊT");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    merger: DetectionMerger,
    deduplicator: SpatialDeduplicator,
    normalizer: TextNormalizer,
    sorter: ReadingOrderSorter,
    router: TranslationRouter,
}

impl Pipeline {
    /// Build a pipeline with an explicitly constructed router.
    pub fn new(config: PipelineConfig, router: TranslationRouter) -> Result<Self> {
        config.validate()?;
        Self::assemble(config, router)
    }

    /// Build a pipeline whose router is wired from `config.translation`.
    #[instrument(skip_all)]
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let router = TranslationRouter::from_config(&config.translation)?;
        Self::assemble(config, router)
    }

    /// Wire the stages from an already validated configuration.
    fn assemble(config: PipelineConfig, router: TranslationRouter) -> Result<Self> {
        let normalizer = TextNormalizer::from_config(&config.normalizer)?;
        Ok(Self {
            merger: DetectionMerger::new(),
            deduplicator: SpatialDeduplicator::new(&config.dedup),
            sorter: ReadingOrderSorter::new(&config.ordering),
            normalizer,
            router,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every synchronous stage: merge, filter/deduplicate, classify and
    /// normalise, then sort into reading order.
    pub fn prepare(&self, detection_lists: Vec<Vec<Detection>>) -> (Vec<NormalizedFragment>, PipelineReport) {
        let merged = self.merger.merge(detection_lists);
        let malformed_dropped = merged.malformed();
        let deduplicated = self.deduplicator.deduplicate(merged.detections);

        let mut fragments: Vec<NormalizedFragment> = deduplicated
            .detections
            .into_iter()
            .map(|detection| NormalizedFragment {
                script: classify_script(&detection.text),
                text: self.normalizer.normalize(&detection.text),
                bbox: detection.bbox,
                confidence: detection.confidence,
            })
            .collect();
        self.sorter.sort_by_box(&mut fragments, |f| &f.bbox);

        let report = PipelineReport {
            received: merged.received,
            malformed_dropped,
            low_confidence_dropped: deduplicated.low_confidence,
            duplicates_suppressed: deduplicated.duplicates,
            ..PipelineReport::default()
        };
        debug!(fragments = fragments.len(), "fragments prepared");
        (fragments, report)
    }

    /// Process one request. Output order is reading order.
    pub async fn process(&self, detection_lists: Vec<Vec<Detection>>) -> Vec<TranslatedFragment> {
        self.process_with_report(detection_lists).await.fragments
    }

    /// Process one request and report what was dropped or recovered.
    pub async fn process_with_report(&self, detection_lists: Vec<Vec<Detection>>) -> PipelineOutcome {
        let request_id = RequestId::new();
        let span = info_span!("pipeline", request = %request_id, engines = detection_lists.len());

        async move {
            let (fragments, mut report) = self.prepare(detection_lists);
            let translations = self.router.translate_all(&fragments).await;

            report.translation_failures = translations.iter().filter(|t| t.is_failure()).count();
            report.passthroughs = translations.iter().filter(|t| t.is_passthrough()).count();

            let fragments: Vec<TranslatedFragment> = fragments
                .into_iter()
                .zip(translations)
                .map(|(fragment, routed)| TranslatedFragment {
                    bbox: fragment.bbox,
                    original: fragment.text,
                    translated: routed.translated,
                })
                .collect();
            report.emitted = fragments.len();

            info!(
                received = report.received,
                emitted = report.emitted,
                malformed = report.malformed_dropped,
                low_confidence = report.low_confidence_dropped,
                duplicates = report.duplicates_suppressed,
                translation_failures = report.translation_failures,
                "request processed"
            );
            PipelineOutcome { fragments, report }
        }
        .instrument(span)
        .await
    }
}
