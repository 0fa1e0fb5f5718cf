//! Static language table for the cloud speech backend.
//!
//! Maps the display labels the interface offers to the language codes the
//! cloud endpoint understands. Many labels share a code: every English
//! regional variant resolves to "en" because the endpoint does not
//! distinguish them. Document outputs and the local engine ignore language
//! entirely.

use crate::error::Pdf2MediaError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Language used when the local engine falls back to the cloud backend,
/// and the default for requests that never picked one.
/// [`crate::config::ConversionConfig::default`] and
/// [`crate::pipeline::speech::FALLBACK_LANGUAGE`] both point here.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Display label → endpoint language code.
///
/// Order matters only for [`labels`], which presents the selection list.
static TABLE: &[(&str, &str)] = &[
    ("English", "en"),
    ("English (Australia)", "en"),
    ("English (India)", "en"),
    ("English (UK)", "en"),
    ("English (US)", "en"),
    ("Arabic", "ar"),
    ("Bengali", "bn"),
    ("Chinese (Mandarin)", "zh-CN"),
    ("Dutch", "nl"),
    ("French", "fr"),
    ("French (Canada)", "fr"),
    ("German", "de"),
    ("Gujarati", "gu"),
    ("Hindi", "hi"),
    ("Indonesian", "id"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Kannada", "kn"),
    ("Korean", "ko"),
    ("Malayalam", "ml"),
    ("Marathi", "mr"),
    ("Portuguese", "pt"),
    ("Portuguese (Brazil)", "pt"),
    ("Russian", "ru"),
    ("Spanish", "es"),
    ("Spanish (Mexico)", "es"),
    ("Tamil", "ta"),
    ("Telugu", "te"),
    ("Thai", "th"),
    ("Turkish", "tr"),
    ("Urdu", "ur"),
    ("Vietnamese", "vi"),
];

static BY_LABEL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TABLE.iter().copied().collect());

/// Resolve a display label to its language code.
pub fn resolve(label: &str) -> Option<&'static str> {
    BY_LABEL.get(label).copied()
}

/// All display labels, in presentation order.
pub fn labels() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|(label, _)| *label)
}

/// Resolve a user-supplied language selection: a display label from the
/// table, or a bare code (e.g. "hi", "zh-CN") passed through verbatim.
///
/// Anything else is [`Pdf2MediaError::UnknownLanguage`].
pub fn resolve_selection(input: &str) -> Result<String, Pdf2MediaError> {
    if let Some(code) = resolve(input) {
        return Ok(code.to_string());
    }
    let looks_like_code = !input.is_empty()
        && input.len() <= 7
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if looks_like_code {
        return Ok(input.to_string());
    }
    Err(Pdf2MediaError::UnknownLanguage {
        label: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_resolves_to_exactly_one_code() {
        for label in labels() {
            assert!(resolve(label).is_some(), "label '{label}' must resolve");
        }
        // The map cannot hold two codes for one label, but the source table
        // could accidentally repeat a label with a different code.
        assert_eq!(BY_LABEL.len(), TABLE.len(), "duplicate label in table");
    }

    #[test]
    fn english_variants_share_a_code() {
        for label in [
            "English",
            "English (Australia)",
            "English (India)",
            "English (UK)",
            "English (US)",
        ] {
            assert_eq!(resolve(label), Some("en"));
        }
    }

    #[test]
    fn unknown_label_resolves_to_none() {
        assert_eq!(resolve("Klingon"), None);
        assert_eq!(resolve("english"), None); // lookup is exact
    }

    #[test]
    fn selection_accepts_labels_and_bare_codes() {
        assert_eq!(resolve_selection("English (India)").unwrap(), "en");
        assert_eq!(resolve_selection("hi").unwrap(), "hi");
        assert_eq!(resolve_selection("zh-CN").unwrap(), "zh-CN");
    }

    #[test]
    fn selection_rejects_unknown_labels() {
        let err = resolve_selection("Definitely Not A Language");
        assert!(matches!(
            err,
            Err(Pdf2MediaError::UnknownLanguage { ref label }) if label == "Definitely Not A Language"
        ));
        assert!(resolve_selection("").is_err());
    }
}
