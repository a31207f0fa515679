// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Concatenation of per-engine detection lists, with ingestion checks.

use lingolens_core::Detection;
use lingolens_core::error::LingolensError;
use tracing::{debug, warn};

/// Flattens the output of several recognition passes into one collection.
///
/// No deduplication happens here: two engines reading the same glyphs both
/// contribute. Detections with a degenerate box or an out-of-range confidence
/// are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionMerger;

/// Result of a merge.
#[derive(Debug, Default)]
pub struct Merged {
    pub detections: Vec<Detection>,
    /// Total detections offered across all lists.
    pub received: usize,
    /// One `MalformedDetection` per dropped detection, in input order.
    pub rejected: Vec<LingolensError>,
}

impl Merged {
    /// How many detections were dropped as malformed.
    pub fn malformed(&self) -> usize {
        self.rejected.len()
    }
}

impl DetectionMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge engine lists in the order given.
    pub fn merge(&self, lists: Vec<Vec<Detection>>) -> Merged {
        let received: usize = lists.iter().map(Vec::len).sum();
        let mut detections = Vec::with_capacity(received);
        let mut rejected = Vec::new();

        for (engine_index, list) in lists.into_iter().enumerate() {
            for detection in list {
                if let Some(defect) = detection.defect() {
                    let err = LingolensError::MalformedDetection(format!(
                        "engine {engine_index}: {defect} (text {:?}, box {:?}, confidence {})",
                        detection.text, detection.bbox, detection.confidence
                    ));
                    warn!(engine_index, error = %err, "dropping malformed detection");
                    rejected.push(err);
                    continue;
                }
                detections.push(detection);
            }
        }

        debug!(received, kept = detections.len(), malformed = rejected.len(), "detections merged");
        Merged {
            detections,
            received,
            rejected,
        }
    }
}
