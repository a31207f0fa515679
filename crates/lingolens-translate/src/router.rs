// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script-keyed translation routing.
//
// Each fragment is looked up in a `ScriptTag → backend` table. Pass-through
// scripts (Latin by default) never leave the process. Every backend call runs
// under its own timeout; any failure degrades to the original text so one bad
// fragment cannot sink the batch.
//
// Calls fan out with bounded concurrency and results are written into slots
// by input index, so the output order never depends on completion order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use lingolens_core::config::{BackendConfig, TranslationConfig};
use lingolens_core::error::{LingolensError, Result};
use lingolens_core::{NormalizedFragment, ScriptTag, TranslationError};
use tracing::{debug, info, instrument, warn};

use crate::backend::TranslationBackend;
use crate::deepl::DeeplBackend;
use crate::google::GoogleBackend;

/// How a fragment's `translated` text was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The backend answered.
    Translated { backend: String },
    /// The script is configured as already being in the target language, or
    /// there is no text to translate.
    Passthrough,
    /// No backend is routed for the script and there is no default.
    Unrouted,
    /// The backend failed; the original text stands in.
    Fallback {
        backend: String,
        error: TranslationError,
    },
}

/// Translation result for one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedTranslation {
    pub translated: String,
    pub outcome: TranslationOutcome,
}

impl RoutedTranslation {
    fn untouched(fragment: &NormalizedFragment, outcome: TranslationOutcome) -> Self {
        Self {
            translated: fragment.text.clone(),
            outcome,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, TranslationOutcome::Fallback { .. })
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(
            self.outcome,
            TranslationOutcome::Passthrough | TranslationOutcome::Unrouted
        )
    }
}

/// Dispatches fragments to backends chosen by script.
#[derive(Clone)]
pub struct TranslationRouter {
    routes: BTreeMap<ScriptTag, Arc<dyn TranslationBackend>>,
    default_backend: Option<Arc<dyn TranslationBackend>>,
    passthrough: BTreeSet<ScriptTag>,
    target_language: String,
    timeout: Duration,
    max_concurrent: usize,
}

impl std::fmt::Debug for TranslationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes: BTreeMap<_, _> = self.routes.iter().map(|(s, b)| (*s, b.name())).collect();
        f.debug_struct("TranslationRouter")
            .field("routes", &routes)
            .field("default_backend", &self.default_backend.as_ref().map(|b| b.name()))
            .field("passthrough", &self.passthrough)
            .field("target_language", &self.target_language)
            .field("timeout", &self.timeout)
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

impl TranslationRouter {
    /// A router with no backends. Every non-pass-through fragment is unrouted
    /// until routes are added.
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            routes: BTreeMap::new(),
            default_backend: None,
            passthrough: config.passthrough_scripts.iter().copied().collect(),
            target_language: config.target_language.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    pub fn with_route(mut self, script: ScriptTag, backend: Arc<dyn TranslationBackend>) -> Self {
        self.routes.insert(script, backend);
        self
    }

    pub fn with_default_backend(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.default_backend = Some(backend);
        self
    }

    /// Instantiate the declared backends and wire up routes.
    ///
    /// A DeepL backend without a resolvable key is skipped with a warning;
    /// scripts routed to it use the default backend instead.
    #[instrument(skip_all, fields(backends = config.backends.len()))]
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut available: BTreeMap<String, Arc<dyn TranslationBackend>> = BTreeMap::new();

        for declared in &config.backends {
            match build_backend(declared, timeout)? {
                Some(backend) => {
                    debug!(backend = declared.name(), "translation backend enabled");
                    available.insert(declared.name().to_string(), backend);
                }
                None => warn!(
                    backend = declared.name(),
                    "translation backend has no credentials; routes to it use the default backend"
                ),
            }
        }

        let mut router = Self::new(config);
        for (script, name) in &config.routes {
            if let Some(backend) = available.get(name) {
                router = router.with_route(*script, Arc::clone(backend));
            }
        }
        if let Some(name) = &config.default_backend {
            if let Some(backend) = available.get(name) {
                router = router.with_default_backend(Arc::clone(backend));
            }
        }

        info!(
            routes = router.routes.len(),
            default_backend = router.default_backend.as_ref().map(|b| b.name()).unwrap_or("none"),
            "translation router ready"
        );
        Ok(router)
    }

    /// Backend responsible for `script`, if any.
    pub fn backend_for(&self, script: ScriptTag) -> Option<&Arc<dyn TranslationBackend>> {
        self.routes.get(&script).or(self.default_backend.as_ref())
    }

    /// Translate one fragment. Never fails: errors become a fallback outcome.
    pub async fn translate(&self, fragment: &NormalizedFragment) -> RoutedTranslation {
        if self.passthrough.contains(&fragment.script)
            || fragment.script == ScriptTag::Unknown
            || fragment.text.trim().is_empty()
        {
            return RoutedTranslation::untouched(fragment, TranslationOutcome::Passthrough);
        }
        let Some(backend) = self.backend_for(fragment.script) else {
            warn!(
                script = %fragment.script,
                text = %fragment.text,
                "no translation backend for script; keeping original text"
            );
            return RoutedTranslation::untouched(fragment, TranslationOutcome::Unrouted);
        };

        let call = backend.translate(&fragment.text, fragment.script, &self.target_language);
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => Err(TranslationError::MalformedPayload(
                "backend returned empty text".into(),
            )),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(TranslationError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(translated) => RoutedTranslation {
                translated,
                outcome: TranslationOutcome::Translated {
                    backend: backend.name().to_string(),
                },
            },
            Err(error) => {
                let failure = LingolensError::TranslationFailure {
                    backend: backend.name().to_string(),
                    source: error.clone(),
                };
                warn!(
                    script = %fragment.script,
                    text = %fragment.text,
                    error = %failure,
                    "translation failed; keeping original text"
                );
                RoutedTranslation::untouched(
                    fragment,
                    TranslationOutcome::Fallback {
                        backend: backend.name().to_string(),
                        error,
                    },
                )
            }
        }
    }

    /// Translate a batch. Output index `i` corresponds to `fragments[i]`.
    #[instrument(skip_all, fields(fragments = fragments.len(), max_concurrent = self.max_concurrent))]
    pub async fn translate_all(&self, fragments: &[NormalizedFragment]) -> Vec<RoutedTranslation> {
        let mut slots: Vec<Option<RoutedTranslation>> = vec![None; fragments.len()];

        let mut calls = futures::stream::iter(fragments.iter().enumerate())
            .map(|(index, fragment)| async move { (index, self.translate(fragment).await) })
            .buffer_unordered(self.max_concurrent);
        while let Some((index, routed)) = calls.next().await {
            slots[index] = Some(routed);
        }

        let results: Vec<RoutedTranslation> = slots
            .into_iter()
            .zip(fragments)
            .map(|(slot, fragment)| {
                slot.unwrap_or_else(|| {
                    RoutedTranslation::untouched(fragment, TranslationOutcome::Unrouted)
                })
            })
            .collect();

        let failures = results.iter().filter(|r| r.is_failure()).count();
        debug!(translated = results.len(), failures, "translation batch complete");
        results
    }
}

fn build_backend(
    declared: &BackendConfig,
    timeout: Duration,
) -> Result<Option<Arc<dyn TranslationBackend>>> {
    let backend: Arc<dyn TranslationBackend> = match declared {
        BackendConfig::Deepl {
            name,
            endpoint,
            api_key,
            api_key_env,
        } => {
            let key = api_key.clone().or_else(|| {
                api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.trim().is_empty())
            });
            let Some(key) = key else {
                return Ok(None);
            };
            Arc::new(DeeplBackend::new(name.as_str(), endpoint.as_str(), key, timeout)?)
        }
        BackendConfig::Google { name, endpoint } => {
            Arc::new(GoogleBackend::new(name.as_str(), endpoint.as_str(), timeout)?)
        }
    };
    Ok(Some(backend))
}
