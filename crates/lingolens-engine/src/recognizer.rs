// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition engine abstraction and the concurrent engine runner.
//
// Each engine runs on its own blocking task. The runner joins all of them and
// yields one detection list per engine, in engine order. An engine that
// errors or panics contributes an empty list.

use std::sync::Arc;

use futures::future::join_all;
use image::DynamicImage;
use lingolens_core::Detection;
use lingolens_core::error::{LingolensError, Result};
use tracing::{debug, instrument, warn};

/// A text recognition engine.
///
/// Implementations are synchronous and typically CPU-bound; [`run_engines`]
/// moves each call onto the blocking thread pool.
pub trait RecognitionEngine: Send + Sync {
    /// Short identifier used in logs, e.g. `"latin"` or `"devanagari"`.
    fn name(&self) -> &str;

    /// Detect and read text regions in `image`.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Run every engine against `image` concurrently and wait for all of them.
///
/// The returned vector has one entry per engine, in the order given.
#[instrument(skip_all, fields(engines = engines.len()))]
pub async fn run_engines(
    engines: &[Arc<dyn RecognitionEngine>],
    image: Arc<DynamicImage>,
) -> Vec<Vec<Detection>> {
    let passes = engines.iter().map(|engine| {
        let engine = Arc::clone(engine);
        let image = Arc::clone(&image);
        async move {
            let name = engine.name().to_string();
            let joined = tokio::task::spawn_blocking(move || engine.recognize(&image)).await;
            let outcome = match joined {
                Ok(result) => result,
                Err(join_err) => Err(LingolensError::EngineUnavailable {
                    engine: name.clone(),
                    reason: join_err.to_string(),
                }),
            };
            match outcome {
                Ok(detections) => {
                    debug!(engine = %name, detections = detections.len(), "engine finished");
                    detections
                }
                Err(err) => {
                    warn!(engine = %name, error = %err, "engine contributed no detections");
                    Vec::new()
                }
            }
        }
    });
    join_all(passes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingolens_core::BoundingBox;
    use std::time::Duration;

    struct FixedEngine {
        name: &'static str,
        text: &'static str,
        delay: Duration,
    }

    impl RecognitionEngine for FixedEngine {
        fn name(&self) -> &str {
            self.name
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
            std::thread::sleep(self.delay);
            Ok(vec![Detection::new(
                BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                self.text,
                0.9,
            )])
        }
    }

    struct BrokenEngine;

    impl RecognitionEngine for BrokenEngine {
        fn name(&self) -> &str {
            "broken"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
            Err(LingolensError::EngineUnavailable {
                engine: "broken".into(),
                reason: "model missing".into(),
            })
        }
    }

    struct PanickingEngine;

    impl RecognitionEngine for PanickingEngine {
        fn name(&self) -> &str {
            "panicking"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
            panic!("inference crashed");
        }
    }

    fn blank() -> Arc<DynamicImage> {
        Arc::new(DynamicImage::new_rgb8(16, 16))
    }

    #[tokio::test]
    async fn results_follow_engine_order_not_completion_order() {
        let engines: Vec<Arc<dyn RecognitionEngine>> = vec![
            Arc::new(FixedEngine {
                name: "slow",
                text: "first",
                delay: Duration::from_millis(80),
            }),
            Arc::new(FixedEngine {
                name: "fast",
                text: "second",
                delay: Duration::ZERO,
            }),
        ];
        let lists = run_engines(&engines, blank()).await;
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0][0].text, "first");
        assert_eq!(lists[1][0].text, "second");
    }

    #[tokio::test]
    async fn failing_and_panicking_engines_contribute_nothing() {
        let engines: Vec<Arc<dyn RecognitionEngine>> = vec![
            Arc::new(BrokenEngine),
            Arc::new(FixedEngine {
                name: "latin",
                text: "EXIT",
                delay: Duration::ZERO,
            }),
            Arc::new(PanickingEngine),
        ];
        let lists = run_engines(&engines, blank()).await;
        assert_eq!(lists.len(), 3);
        assert!(lists[0].is_empty());
        assert_eq!(lists[1].len(), 1);
        assert!(lists[2].is_empty());
    }

    #[tokio::test]
    async fn no_engines_no_lists() {
        assert!(run_engines(&[], blank()).await.is_empty());
    }
}
