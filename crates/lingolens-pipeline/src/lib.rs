// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lingolens-pipeline: Post-processing of raw multi-engine text detections.
//
// Stages run strictly forward: merge (with ingestion checks) → confidence
// filter and spatial deduplication → script classification and text
// normalisation → reading-order sort → translation routing.

pub mod dedup;
pub mod merge;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod script;

pub use dedup::SpatialDeduplicator;
pub use merge::DetectionMerger;
pub use normalize::{CorrectionTable, TextNormalizer};
pub use order::ReadingOrderSorter;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use script::classify_script;
