// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lingolens.

use thiserror::Error;

use crate::types::ErrorClass;

/// Top-level error type for all Lingolens operations.
#[derive(Debug, Error)]
pub enum LingolensError {
    // -- Recognition --
    #[error("recognition engine `{engine}` unavailable: {reason}")]
    EngineUnavailable { engine: String, reason: String },

    #[error("malformed detection dropped: {0}")]
    MalformedDetection(String),

    #[error("image could not be decoded: {0}")]
    InputDecode(String),

    #[error("image could not be written: {0}")]
    ImageEncode(String),

    // -- Translation --
    #[error("translation via `{backend}` failed: {source}")]
    TranslationFailure {
        backend: String,
        #[source]
        source: TranslationError,
    },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LingolensError>;

/// Failure of a single backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response payload: {0}")]
    MalformedPayload(String),
}

/// Decide whether an error may be absorbed by the pipeline or must reach the caller.
///
/// Engine outages, translation failures and malformed detections are
/// recovered locally; decode failures and configuration problems abort the
/// request.
pub fn classify_error(err: &LingolensError) -> ErrorClass {
    match err {
        LingolensError::EngineUnavailable { .. } => ErrorClass::Recovered,
        LingolensError::MalformedDetection(_) => ErrorClass::Recovered,
        LingolensError::TranslationFailure { .. } => ErrorClass::Recovered,

        LingolensError::InputDecode(_) => ErrorClass::Fatal,
        LingolensError::ImageEncode(_) => ErrorClass::Fatal,
        LingolensError::Config(_) => ErrorClass::Fatal,
        LingolensError::Io(_) => ErrorClass::Fatal,
        LingolensError::Serialization(_) => ErrorClass::Fatal,
    }
}
