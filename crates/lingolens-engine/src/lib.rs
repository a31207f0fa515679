// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lingolens-engine: Everything around the pipeline that touches pixels.
//
// Provides the recognition engine abstraction with a concurrent runner,
// image decoding, and rendering of fragment boxes and text onto the source
// image.
// The `ocrs`-backed engine is available behind the `ocr` feature.

pub mod imaging;
pub mod recognizer;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use imaging::{Annotator, decode_image, load_image};
pub use recognizer::{RecognitionEngine, run_engines};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrsEngine};
