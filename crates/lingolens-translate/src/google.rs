// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Google Translate backend (keyless `translate_a/single` endpoint).
//
// The payload is a nested JSON array whose first element lists sentence
// segments; the translated text is the first string of every segment.

use std::time::Duration;

use async_trait::async_trait;
use lingolens_core::error::{LingolensError, Result};
use lingolens_core::{ScriptTag, TranslationError};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::backend::{TranslationBackend, transport_error};

/// Google Translate backend.
pub struct GoogleBackend {
    name: String,
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl GoogleBackend {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LingolensError::Config(format!("Google HTTP client: {e}")))?;
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
            timeout,
        })
    }
}

/// Google `sl` parameter for a script.
fn source_lang(script: ScriptTag) -> &'static str {
    match script {
        ScriptTag::HanSimplified => "zh-CN",
        other => other.language_code().unwrap_or("auto"),
    }
}

fn parse_response(body: &str) -> std::result::Result<String, TranslationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::MalformedPayload(e.to_string()))?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::MalformedPayload("missing segment list".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(TranslationError::MalformedPayload(
            "no translated segments".into(),
        ));
    }
    Ok(translated)
}

#[async_trait]
impl TranslationBackend for GoogleBackend {
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
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang(source)),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
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
        debug!(chars = translated.chars().count(), "Google translation received");
        Ok(translated)
    }
}
