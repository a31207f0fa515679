// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.
//
// One `PipelineConfig` is built at startup (defaults or a JSON file) and passed
// explicitly to every component. Nothing here is mutated by a request.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{LingolensError, Result};
use crate::types::ScriptTag;

/// Default DeepL free-tier endpoint.
pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
/// Default Google endpoint (the keyless `translate_a/single` web client API).
pub const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
/// Environment variable consulted for the DeepL key when none is given inline.
pub const DEEPL_KEY_ENV: &str = "DEEPL_AUTH_KEY";

/// Complete configuration for one pipeline instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dedup: DedupConfig,
    pub ordering: OrderingConfig,
    pub normalizer: NormalizerConfig,
    pub translation: TranslationConfig,
}

/// Which detection survives when several overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Visit candidates by descending confidence; ties keep input order.
    #[default]
    HighestConfidence,
    /// Visit candidates in input order.
    FirstSeen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Detections below this confidence are discarded before overlap checks.
    pub confidence_threshold: f32,
    /// Pairs whose IoU exceeds this are the same physical region.
    pub iou_threshold: f32,
    pub policy: DedupPolicy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            iou_threshold: 0.5,
            policy: DedupPolicy::HighestConfidence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Row height as a multiple of the batch's mean box height.
    pub row_height_factor: f32,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            row_height_factor: 0.8,
        }
    }
}

/// One exact-substring correction, applied after upper-casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    pub from: String,
    pub to: String,
}

impl CorrectionRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Inline correction rules, applied in order.
    pub corrections: Vec<CorrectionRule>,
    /// Optional JSON file whose rules replace `corrections` when present.
    pub corrections_path: Option<PathBuf>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            corrections: vec![
                CorrectionRule::new("ARR?T", "ARRÊT"),
                CorrectionRule::new("ARRET", "ARRÊT"),
            ],
            corrections_path: None,
        }
    }
}

/// Declaration of one translation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Deepl {
        name: String,
        #[serde(default = "default_deepl_endpoint")]
        endpoint: String,
        /// Inline key. Takes precedence over `api_key_env`.
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        api_key_env: Option<String>,
    },
    Google {
        name: String,
        #[serde(default = "default_google_endpoint")]
        endpoint: String,
    },
}

fn default_deepl_endpoint() -> String {
    DEEPL_FREE_ENDPOINT.to_string()
}

fn default_google_endpoint() -> String {
    GOOGLE_ENDPOINT.to_string()
}

impl BackendConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Deepl { name, .. } | Self::Google { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Target language code handed to every backend.
    pub target_language: String,
    /// Per-call timeout.
    pub timeout_ms: u64,
    /// Upper bound on in-flight backend calls per request.
    pub max_concurrent: usize,
    /// Scripts returned unchanged without a backend call.
    pub passthrough_scripts: Vec<ScriptTag>,
    pub backends: Vec<BackendConfig>,
    /// Script → backend name.
    pub routes: BTreeMap<ScriptTag, String>,
    /// Used for scripts without a route, or whose routed backend is unavailable.
    pub default_backend: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let routes = BTreeMap::from([
            (ScriptTag::HanSimplified, "deepl".to_string()),
            (ScriptTag::Japanese, "deepl".to_string()),
            (ScriptTag::Korean, "deepl".to_string()),
            (ScriptTag::Arabic, "deepl".to_string()),
            (ScriptTag::Devanagari, "google".to_string()),
        ]);
        Self {
            target_language: "en".to_string(),
            timeout_ms: 5_000,
            max_concurrent: 4,
            passthrough_scripts: vec![ScriptTag::Latin],
            backends: vec![
                BackendConfig::Deepl {
                    name: "deepl".to_string(),
                    endpoint: default_deepl_endpoint(),
                    api_key: None,
                    api_key_env: Some(DEEPL_KEY_ENV.to_string()),
                },
                BackendConfig::Google {
                    name: "google".to_string(),
                    endpoint: default_google_endpoint(),
                },
            ],
            routes,
            default_backend: Some("google".to_string()),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from a JSON file.
    ///
    /// Missing sections and fields take their defaults. Values are not
    /// checked here; `Pipeline` construction calls [`validate`](Self::validate).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(
            backends = config.translation.backends.len(),
            routes = config.translation.routes.len(),
            "pipeline configuration loaded"
        );
        Ok(config)
    }

    /// Check ranges and cross-references.
    pub fn validate(&self) -> Result<()> {
        let dedup = &self.dedup;
        if !(0.0..=1.0).contains(&dedup.confidence_threshold) {
            return Err(LingolensError::Config(format!(
                "dedup.confidence_threshold must be within [0, 1], got {}",
                dedup.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&dedup.iou_threshold) {
            return Err(LingolensError::Config(format!(
                "dedup.iou_threshold must be within [0, 1], got {}",
                dedup.iou_threshold
            )));
        }

        let factor = self.ordering.row_height_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(LingolensError::Config(format!(
                "ordering.row_height_factor must be a positive number, got {factor}"
            )));
        }

        if let Some(rule) = self.normalizer.corrections.iter().find(|r| r.from.is_empty()) {
            return Err(LingolensError::Config(format!(
                "correction rule with empty pattern (replacement `{}`)",
                rule.to
            )));
        }

        let translation = &self.translation;
        if translation.max_concurrent == 0 {
            return Err(LingolensError::Config(
                "translation.max_concurrent must be at least 1".into(),
            ));
        }
        if translation.timeout_ms == 0 {
            return Err(LingolensError::Config(
                "translation.timeout_ms must be greater than 0".into(),
            ));
        }
        if translation.target_language.trim().is_empty() {
            return Err(LingolensError::Config(
                "translation.target_language must not be empty".into(),
            ));
        }

        let mut names = BTreeSet::new();
        for backend in &translation.backends {
            if !names.insert(backend.name()) {
                return Err(LingolensError::Config(format!(
                    "backend `{}` declared more than once",
                    backend.name()
                )));
            }
        }
        for (script, backend) in &translation.routes {
            if !names.contains(backend.as_str()) {
                return Err(LingolensError::Config(format!(
                    "route for {script} references undeclared backend `{backend}`"
                )));
            }
        }
        if let Some(default) = &translation.default_backend {
            if !names.contains(default.as_str()) {
                return Err(LingolensError::Config(format!(
                    "default backend `{default}` is not declared"
                )));
            }
        }

        Ok(())
    }
}
