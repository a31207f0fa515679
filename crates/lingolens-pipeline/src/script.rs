// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script classification from Unicode code-point ranges.

use lingolens_core::ScriptTag;

/// Code-point ranges (inclusive) recognised as non-Latin scripts.
///
/// Kana is listed before Han so that the table reads by specificity, but the
/// scan is per character: the first character falling in any range decides.
const SCRIPT_RANGES: &[(char, char, ScriptTag)] = &[
    // Devanagari, Devanagari Extended
    ('\u{0900}', '\u{097F}', ScriptTag::Devanagari),
    ('\u{A8E0}', '\u{A8FF}', ScriptTag::Devanagari),
    // Hiragana, Katakana, Katakana Phonetic Extensions, half-width Katakana
    ('\u{3040}', '\u{309F}', ScriptTag::Japanese),
    ('\u{30A0}', '\u{30FF}', ScriptTag::Japanese),
    ('\u{31F0}', '\u{31FF}', ScriptTag::Japanese),
    ('\u{FF66}', '\u{FF9F}', ScriptTag::Japanese),
    // Hangul Jamo, Compatibility Jamo, Syllables
    ('\u{1100}', '\u{11FF}', ScriptTag::Korean),
    ('\u{3130}', '\u{318F}', ScriptTag::Korean),
    ('\u{AC00}', '\u{D7AF}', ScriptTag::Korean),
    // CJK Unified Ideographs, Extension A
    ('\u{4E00}', '\u{9FFF}', ScriptTag::HanSimplified),
    ('\u{3400}', '\u{4DBF}', ScriptTag::HanSimplified),
    // Arabic, Arabic Supplement, Presentation Forms A and B
    ('\u{0600}', '\u{06FF}', ScriptTag::Arabic),
    ('\u{0750}', '\u{077F}', ScriptTag::Arabic),
    ('\u{FB50}', '\u{FDFF}', ScriptTag::Arabic),
    ('\u{FE70}', '\u{FEFF}', ScriptTag::Arabic),
];

fn script_of(c: char) -> Option<ScriptTag> {
    SCRIPT_RANGES
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&c))
        .map(|(_, _, tag)| *tag)
}

/// Classify `text` by the first character that falls in a non-Latin range.
///
/// Text with no such character is Latin; text that is empty after trimming
/// is [`ScriptTag::Unknown`].
pub fn classify_script(text: &str) -> ScriptTag {
    let text = text.trim();
    if text.is_empty() {
        return ScriptTag::Unknown;
    }
    text.chars().find_map(script_of).unwrap_or(ScriptTag::Latin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_latin() {
        assert_eq!(classify_script("STOP 42"), ScriptTag::Latin);
        assert_eq!(classify_script("rue de l'Église"), ScriptTag::Latin);
    }

    #[test]
    fn devanagari_only() {
        assert_eq!(classify_script("नमस्ते"), ScriptTag::Devanagari);
    }

    #[test]
    fn han_kana_hangul_arabic() {
        assert_eq!(classify_script("出口"), ScriptTag::HanSimplified);
        assert_eq!(classify_script("ひらがな"), ScriptTag::Japanese);
        assert_eq!(classify_script("カタカナ"), ScriptTag::Japanese);
        assert_eq!(classify_script("안녕하세요"), ScriptTag::Korean);
        assert_eq!(classify_script("مرحبا"), ScriptTag::Arabic);
    }

    #[test]
    fn mixed_text_takes_first_non_latin_range() {
        assert_eq!(classify_script("EXIT 出口 ひらがな"), ScriptTag::HanSimplified);
        assert_eq!(classify_script("Platform नमस्ते 出口"), ScriptTag::Devanagari);
        // Kanji followed by kana: the kanji comes first.
        assert_eq!(classify_script("東京へ"), ScriptTag::HanSimplified);
        assert_eq!(classify_script("へ東京"), ScriptTag::Japanese);
    }

    #[test]
    fn empty_and_whitespace_are_unknown() {
        assert_eq!(classify_script(""), ScriptTag::Unknown);
        assert_eq!(classify_script("   \t"), ScriptTag::Unknown);
    }

    #[test]
    fn punctuation_only_is_latin() {
        assert_eq!(classify_script("?!"), ScriptTag::Latin);
    }
}
