// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lingolens-translate: Translation backends and the script-keyed router that
// dispatches normalised fragments to them with bounded concurrency and a
// fall-back-to-original policy on failure.

pub mod backend;
pub mod deepl;
pub mod google;
pub mod router;

#[cfg(test)]
mod test_server;

pub use backend::TranslationBackend;
pub use deepl::DeeplBackend;
pub use google::GoogleBackend;
pub use router::{RoutedTranslation, TranslationOutcome, TranslationRouter};
