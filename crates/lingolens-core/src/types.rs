// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Lingolens detection post-processing pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier attached to one pipeline invocation (used in tracing spans only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned box in image pixel coordinates: top-left `(x0, y0)`,
/// bottom-right `(x2, y2)`.
///
/// Serialised as a four-element array `[x0, y0, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x2: f32, y2: f32) -> Self {
        Self { x0, y0, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Vertical centre, used for row clustering.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y2) / 2.0
    }

    /// Finite coordinates and strictly positive extent on both axes.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 < self.x2
            && self.y0 < self.y2
    }

    /// Area of the overlap with `other` (0 when disjoint or only touching).
    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x0.max(other.x0)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y0.max(other.y0)).max(0.0);
        w * h
    }

    /// Intersection over Union with `other`; 0 when the union area is 0.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x0, y0, x2, y2]: [f32; 4]) -> Self {
        Self { x0, y0, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x2, b.y2]
    }
}

/// One text region reported by a recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub text: String,
    /// Engine confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Describe why this detection is malformed, or `None` when it is usable.
    pub fn defect(&self) -> Option<&'static str> {
        if !self.bbox.is_well_formed() {
            Some("degenerate or non-finite bounding box")
        } else if !(0.0..=1.0).contains(&self.confidence) {
            Some("confidence outside [0, 1]")
        } else {
            None
        }
    }
}

/// Writing system of a text fragment, derived from its code points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ScriptTag {
    Latin,
    Devanagari,
    /// CJK ideographs, treated as Simplified Chinese.
    HanSimplified,
    /// Hiragana / Katakana.
    Japanese,
    /// Hangul.
    Korean,
    Arabic,
    /// No classifiable characters (e.g. empty text).
    Unknown,
}

impl ScriptTag {
    /// ISO 639-1 code of the language most commonly written in this script.
    pub fn language_code(&self) -> Option<&'static str> {
        match self {
            Self::Latin => Some("en"),
            Self::Devanagari => Some("hi"),
            Self::HanSimplified => Some("zh"),
            Self::Japanese => Some("ja"),
            Self::Korean => Some("ko"),
            Self::Arabic => Some("ar"),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ScriptTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Latin => "Latin",
            Self::Devanagari => "Devanagari",
            Self::HanSimplified => "Han (Simplified)",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Arabic => "Arabic",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// A surviving detection after classification and normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFragment {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub text: String,
    pub script: ScriptTag,
    pub confidence: f32,
}

/// Final output unit. Position in the output sequence is the reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedFragment {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub original: String,
    pub translated: String,
}

/// Per-request counters for everything the pipeline dropped or recovered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Detections received across all engine lists.
    pub received: usize,
    /// Dropped at ingestion for a degenerate box or bad confidence.
    pub malformed_dropped: usize,
    /// Dropped for confidence below the configured threshold.
    pub low_confidence_dropped: usize,
    /// Suppressed as overlapping an accepted detection.
    pub duplicates_suppressed: usize,
    /// Fragments whose backend call failed and fell back to the original.
    pub translation_failures: usize,
    /// Fragments returned untranslated by policy (pass-through script or no backend).
    pub passthroughs: usize,
    /// Fragments in the output.
    pub emitted: usize,
}

/// Classification of errors: may the pipeline swallow it or must it surface?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Handled locally (logged, counted) without failing the request.
    Recovered,
    /// Aborts the request and is reported to the caller.
    Fatal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!((b.iou(&b) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 0.0, 30.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.intersection_area(&b), 0.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_shifted_boxes() {
        // Intersection 48x19 = 912, union 1000 + 1000 - 912 = 1088.
        let a = BoundingBox::new(0.0, 0.0, 50.0, 20.0);
        let b = BoundingBox::new(2.0, 1.0, 52.0, 21.0);
        let iou = a.iou(&b);
        assert!((iou - 912.0 / 1088.0).abs() < 1e-5, "got {iou}");
    }

    #[test]
    fn zero_area_union_yields_zero() {
        let a = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn degenerate_boxes_are_not_well_formed() {
        assert!(!BoundingBox::new(10.0, 0.0, 10.0, 5.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 8.0, 5.0, 2.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 0.0, f32::NAN, 5.0).is_well_formed());
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
    }

    #[test]
    fn detection_defects() {
        let good = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        assert!(Detection::new(good, "ok", 0.5).defect().is_none());
        assert!(Detection::new(good, "hot", 1.2).defect().is_some());
        assert!(Detection::new(good, "nan", f32::NAN).defect().is_some());
        let flat = BoundingBox::new(0.0, 3.0, 4.0, 3.0);
        assert!(Detection::new(flat, "flat", 0.9).defect().is_some());
    }

    #[test]
    fn detection_json_uses_box_array() {
        let json = r#"{"box":[1.0,2.0,30.0,12.0],"text":"STOP","confidence":0.75}"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.bbox, BoundingBox::new(1.0, 2.0, 30.0, 12.0));
        assert_eq!(det.text, "STOP");

        let back = serde_json::to_string(&det).unwrap();
        assert!(back.contains(r#""box":[1.0,2.0,30.0,12.0]"#), "got {back}");
    }

    #[test]
    fn script_tag_language_codes() {
        assert_eq!(ScriptTag::Devanagari.language_code(), Some("hi"));
        assert_eq!(ScriptTag::HanSimplified.language_code(), Some("zh"));
        assert_eq!(ScriptTag::Unknown.language_code(), None);
    }
}
