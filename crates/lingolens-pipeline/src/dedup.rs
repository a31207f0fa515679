// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Confidence filtering and cross-engine spatial deduplication.
//
// Several engines tuned to different scripts frequently report the same
// physical text region. Two detections whose boxes overlap with an IoU above
// the configured threshold are treated as one region and only one survives.
//
// Suppression is greedy and pairwise: candidates are visited in a fixed order
// and each is accepted unless it overlaps something already accepted. There is
// no transitive closure, so A-B-C chains where A and C do not overlap may keep
// both A and C.

use lingolens_core::Detection;
use lingolens_core::config::{DedupConfig, DedupPolicy};
use tracing::{debug, trace};

/// Removes low-confidence and overlapping detections.
#[derive(Debug, Clone)]
pub struct SpatialDeduplicator {
    confidence_threshold: f32,
    iou_threshold: f32,
    policy: DedupPolicy,
}

/// Survivors plus counts of what was removed.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// Survivors, in their original input order.
    pub detections: Vec<Detection>,
    pub low_confidence: usize,
    pub duplicates: usize,
}

impl SpatialDeduplicator {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            policy: config.policy,
        }
    }

    /// Filter by confidence, then suppress overlaps.
    pub fn deduplicate(&self, detections: Vec<Detection>) -> Deduplicated {
        let before = detections.len();
        let candidates: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.confidence >= self.confidence_threshold)
            .collect();
        let low_confidence = before - candidates.len();

        // Visiting order. The sort is stable, so equal confidences keep
        // input order.
        let mut visit: Vec<usize> = (0..candidates.len()).collect();
        if self.policy == DedupPolicy::HighestConfidence {
            visit.sort_by(|&a, &b| {
                candidates[b]
                    .confidence
                    .total_cmp(&candidates[a].confidence)
            });
        }

        let mut accepted: Vec<usize> = Vec::with_capacity(candidates.len());
        for idx in visit {
            let bbox = &candidates[idx].bbox;
            let overlapping = accepted
                .iter()
                .find(|&&kept| candidates[kept].bbox.iou(bbox) > self.iou_threshold);
            match overlapping {
                Some(&kept) => trace!(
                    suppressed = %candidates[idx].text,
                    kept = %candidates[kept].text,
                    "overlapping detection suppressed"
                ),
                None => accepted.push(idx),
            }
        }

        let duplicates = candidates.len() - accepted.len();
        accepted.sort_unstable();

        let mut keep = vec![false; candidates.len()];
        for idx in accepted {
            keep[idx] = true;
        }
        let detections: Vec<Detection> = candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(d, k)| k.then_some(d))
            .collect();

        debug!(
            survivors = detections.len(),
            low_confidence,
            duplicates,
            policy = ?self.policy,
            "deduplication complete"
        );
        Deduplicated {
            detections,
            low_confidence,
            duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingolens_core::BoundingBox;

    fn det(bbox: (f32, f32, f32, f32), text: &str, confidence: f32) -> Detection {
        Detection::new(BoundingBox::new(bbox.0, bbox.1, bbox.2, bbox.3), text, confidence)
    }

    fn dedup(policy: DedupPolicy) -> SpatialDeduplicator {
        SpatialDeduplicator::new(&DedupConfig {
            policy,
            ..DedupConfig::default()
        })
    }

    fn texts(d: &Deduplicated) -> Vec<&str> {
        d.detections.iter().map(|d| d.text.as_str()).collect()
    }

    #[test]
    fn drops_below_threshold() {
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![
            det((0.0, 0.0, 10.0, 10.0), "keep", 0.4),
            det((20.0, 0.0, 30.0, 10.0), "drop", 0.39),
        ]);
        assert_eq!(texts(&out), ["keep"]);
        assert_eq!(out.low_confidence, 1);
        assert_eq!(out.duplicates, 0);
    }

    #[test]
    fn highest_confidence_wins_regardless_of_position() {
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![
            det((2.0, 1.0, 52.0, 21.0), "ARRET", 0.6),
            det((0.0, 0.0, 50.0, 20.0), "ARR?T", 0.9),
        ]);
        assert_eq!(texts(&out), ["ARR?T"]);
        assert_eq!(out.duplicates, 1);
    }

    #[test]
    fn first_seen_keeps_earliest() {
        let out = dedup(DedupPolicy::FirstSeen).deduplicate(vec![
            det((2.0, 1.0, 52.0, 21.0), "ARRET", 0.6),
            det((0.0, 0.0, 50.0, 20.0), "ARR?T", 0.9),
        ]);
        assert_eq!(texts(&out), ["ARRET"]);
    }

    #[test]
    fn confidence_tie_keeps_input_order() {
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![
            det((0.0, 0.0, 10.0, 10.0), "first", 0.8),
            det((0.0, 0.0, 10.0, 10.0), "second", 0.8),
        ]);
        assert_eq!(texts(&out), ["first"]);
    }

    #[test]
    fn non_overlapping_boxes_both_survive() {
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![
            det((0.0, 0.0, 10.0, 10.0), "left", 0.9),
            det((10.0, 0.0, 20.0, 10.0), "right", 0.5),
        ]);
        assert_eq!(texts(&out), ["left", "right"]);
    }

    #[test]
    fn iou_exactly_at_threshold_is_not_a_duplicate() {
        // Overlap 10x10 = 100, union 150 + 150 - 100 = 200 → IoU 0.5.
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![
            det((0.0, 0.0, 15.0, 10.0), "a", 0.9),
            det((5.0, 0.0, 20.0, 10.0), "b", 0.8),
        ]);
        assert_eq!(out.detections.len(), 2);
    }

    #[test]
    fn suppression_is_not_transitive() {
        // a overlaps b, b overlaps c, a and c are disjoint. b has the
        // highest confidence, so both a and c are suppressed against it.
        let a = det((0.0, 0.0, 10.0, 10.0), "a", 0.7);
        let b = det((2.0, 0.0, 12.0, 10.0), "b", 0.9);
        let c = det((4.0, 0.0, 14.0, 10.0), "c", 0.8);
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![a.clone(), b, c.clone()]);
        assert_eq!(texts(&out), ["b"]);

        // Visiting in input order instead: a is accepted, b suppressed by a,
        // c only overlaps the suppressed b (IoU(a, c) = 60/140) and survives.
        let b = det((2.0, 0.0, 12.0, 10.0), "b", 0.9);
        let out = dedup(DedupPolicy::FirstSeen).deduplicate(vec![a, b, c]);
        assert_eq!(texts(&out), ["a", "c"]);
    }

    #[test]
    fn survivors_keep_input_order() {
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(vec![
            det((100.0, 0.0, 110.0, 10.0), "low", 0.5),
            det((0.0, 0.0, 10.0, 10.0), "high", 0.95),
            det((50.0, 0.0, 60.0, 10.0), "mid", 0.7),
        ]);
        assert_eq!(texts(&out), ["low", "high", "mid"]);
    }

    #[test]
    fn no_surviving_pair_exceeds_threshold() {
        let mut input = Vec::new();
        for i in 0..20 {
            let x = (i % 7) as f32 * 3.0;
            let y = (i / 7) as f32 * 4.0;
            input.push(det((x, y, x + 12.0, y + 8.0), &format!("d{i}"), 0.4 + i as f32 * 0.025));
        }
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(input.clone());
        for (i, a) in out.detections.iter().enumerate() {
            for b in &out.detections[i + 1..] {
                assert!(a.bbox.iou(&b.bbox) <= 0.5, "{} and {} overlap", a.text, b.text);
            }
        }
        assert_eq!(out.detections.len() + out.duplicates + out.low_confidence, input.len());
    }

    #[test]
    fn empty_input() {
        let out = dedup(DedupPolicy::HighestConfidence).deduplicate(Vec::new());
        assert!(out.detections.is_empty());
    }
}
