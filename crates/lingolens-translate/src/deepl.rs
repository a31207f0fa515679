// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DeepL REST API backend.
//
// Form-encoded POST to `/v2/translate` with a `DeepL-Auth-Key` header; the
// response carries `translations[0].text`.

use std::time::Duration;

use async_trait::async_trait;
use lingolens_core::error::{LingolensError, Result};
use lingolens_core::{ScriptTag, TranslationError};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::backend::{TranslationBackend, transport_error};

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// DeepL backend.
pub struct DeeplBackend {
    name: String,
    endpoint: String,
    api_key: String,
    client: Client,
    timeout: Duration,
}

impl DeeplBackend {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LingolensError::Config(format!("DeepL HTTP client: {e}")))?;
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
            timeout,
        })
    }
}

/// DeepL `source_lang` code. `None` lets DeepL detect the language itself,
/// which is also the only option for scripts it has no code for.
fn source_lang(script: ScriptTag) -> Option<&'static str> {
    match script {
        ScriptTag::HanSimplified => Some("ZH"),
        ScriptTag::Japanese => Some("JA"),
        ScriptTag::Korean => Some("KO"),
        ScriptTag::Arabic => Some("AR"),
        ScriptTag::Latin | ScriptTag::Devanagari | ScriptTag::Unknown => None,
    }
}

fn parse_response(body: &str) -> std::result::Result<String, TranslationError> {
    let parsed: DeeplResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::MalformedPayload(e.to_string()))?;
    parsed
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| TranslationError::MalformedPayload("empty `translations` array".into()))
}

#[async_trait]
impl TranslationBackend for DeeplBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(backend = %self.name, script = %source))]
    async fn translate(
        &self,
        text: &str,
        source: ScriptTag,
        target_language: &str,
    ) -> std::result::Result<String, TranslationError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let target = target_language.to_ascii_uppercase();
        let mut form: Vec<(&str, &str)> = vec![("text", text), ("target_lang", target.as_str())];
        if let Some(lang) = source_lang(source) {
            form.push(("source_lang", lang));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;
        let translated = parse_response(&body)?;
        debug!(chars = translated.chars().count(), "DeepL translation received");
        Ok(translated)
    }
}
