// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Translation backend trait.

use async_trait::async_trait;
use lingolens_core::{ScriptTag, TranslationError};

/// A remote (or local) service that translates one fragment at a time.
///
/// Implementations must not retry internally; the router owns timeouts and
/// falls back to the original text on any error.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Name used in configuration routes and log output.
    fn name(&self) -> &str;

    /// Translate `text`, written in `source`, into `target_language`.
    async fn translate(
        &self,
        text: &str,
        source: ScriptTag,
        target_language: &str,
    ) -> Result<String, TranslationError>;
}

/// Map a `reqwest` failure onto the backend error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error, timeout_ms: u64) -> TranslationError {
    if err.is_timeout() {
        TranslationError::Timeout { timeout_ms }
    } else if err.is_decode() {
        TranslationError::MalformedPayload(err.to_string())
    } else {
        TranslationError::Transport(err.to_string())
    }
}
