// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text canonicalisation and correction of known OCR misreads.
//
// The correction table is data: it comes from the pipeline configuration or a
// standalone JSON file and can be swapped without touching this code.

use std::path::Path;

use lingolens_core::config::{CorrectionRule, NormalizerConfig};
use lingolens_core::error::{LingolensError, Result};
use tracing::{debug, instrument};

/// Ordered list of exact-substring replacements.
///
/// Rules apply one after another in list order, each to the output of the
/// previous, so overlapping rules behave deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionTable {
    rules: Vec<CorrectionRule>,
}

impl CorrectionTable {
    pub fn new(rules: Vec<CorrectionRule>) -> Result<Self> {
        if rules.iter().any(|r| r.from.is_empty()) {
            return Err(LingolensError::Config(
                "correction rule with empty pattern".into(),
            ));
        }
        Ok(Self { rules })
    }

    /// Load a table from a JSON array of `{ "from": ..., "to": ... }` objects.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let rules: Vec<CorrectionRule> = serde_json::from_str(&raw)?;
        debug!(rules = rules.len(), "correction table loaded");
        Self::new(rules)
    }

    /// Build from configuration: the file wins over inline rules when set.
    pub fn from_config(config: &NormalizerConfig) -> Result<Self> {
        match &config.corrections_path {
            Some(path) => Self::from_json_file(path),
            None => Self::new(config.corrections.clone()),
        }
    }

    pub fn rules(&self) -> &[CorrectionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, rule| {
            if acc.contains(rule.from.as_str()) {
                acc.replace(rule.from.as_str(), &rule.to)
            } else {
                acc
            }
        })
    }
}

/// Trim, upper-case, then correct.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    table: CorrectionTable,
}

impl TextNormalizer {
    pub fn new(table: CorrectionTable) -> Self {
        Self { table }
    }

    pub fn from_config(config: &NormalizerConfig) -> Result<Self> {
        Ok(Self::new(CorrectionTable::from_config(config)?))
    }

    pub fn table(&self) -> &CorrectionTable {
        &self.table
    }

    pub fn normalize(&self, text: &str) -> String {
        self.table.apply(&text.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn default_normalizer() -> TextNormalizer {
        TextNormalizer::from_config(&NormalizerConfig::default()).unwrap()
    }

    #[test]
    fn trims_and_uppercases() {
        assert_eq!(default_normalizer().normalize("  livraisons \n"), "LIVRAISONS");
    }

    #[test]
    fn corrects_known_misreads() {
        let n = default_normalizer();
        assert_eq!(n.normalize("ARR?T"), "ARRÊT");
        assert_eq!(n.normalize("arret"), "ARRÊT");
        assert_eq!(n.normalize("Point d'arrêt"), "POINT D'ARRÊT");
    }

    #[test]
    fn rules_apply_in_order() {
        let table = CorrectionTable::new(vec![
            CorrectionRule::new("AB", "X"),
            CorrectionRule::new("XC", "Y"),
        ])
        .unwrap();
        assert_eq!(table.apply("ABC"), "Y");

        let reversed = CorrectionTable::new(vec![
            CorrectionRule::new("XC", "Y"),
            CorrectionRule::new("AB", "X"),
        ])
        .unwrap();
        assert_eq!(reversed.apply("ABC"), "XC");
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(CorrectionTable::new(vec![CorrectionRule::new("", "x")]).is_err());
    }

    #[test]
    fn non_latin_text_passes_through_uppercasing() {
        assert_eq!(default_normalizer().normalize(" नमस्ते "), "नमस्ते");
    }

    #[test]
    fn table_file_replaces_inline_rules() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "from": "0K", "to": "OK" }}]"#).unwrap();

        let config = NormalizerConfig {
            corrections: vec![CorrectionRule::new("OK", "NOPE")],
            corrections_path: Some(file.path().to_path_buf()),
        };
        let n = TextNormalizer::from_config(&config).unwrap();
        assert_eq!(n.table().len(), 1);
        assert_eq!(n.normalize("0k"), "OK");
    }

    #[test]
    fn missing_table_file_is_an_error() {
        let config = NormalizerConfig {
            corrections: Vec::new(),
            corrections_path: Some("/nonexistent/corrections.json".into()),
        };
        assert!(matches!(
            TextNormalizer::from_config(&config),
            Err(LingolensError::Io(_))
        ));
    }
}
