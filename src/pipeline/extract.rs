//! Text extraction: PDF bytes → one concatenated string.
//!
//! ## Why no error type?
//!
//! The upload flow treats an unreadable document the same as a document
//! with no text: the user sees an empty preview (plus, in the verbose
//! configuration, a warning). Extraction therefore degrades to an empty
//! string on every failure instead of returning `Result` — the conversion
//! layer turns an empty string into
//! [`crate::error::Pdf2MediaError::EmptyText`] when asked to convert it.

use crate::config::ConversionConfig;
use tracing::{debug, warn};

/// Leading bytes of every well-formed PDF.
const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Whether `bytes` plausibly holds a PDF document.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.len() >= PDF_MAGIC.len() && &bytes[..PDF_MAGIC.len()] == PDF_MAGIC
}

/// Extract text from PDF bytes, page by page, in page order.
///
/// Pages that yield no text contribute nothing — no placeholder. Any
/// parse failure degrades the whole result to an empty string; this
/// function never errors and never panics on malformed input. With
/// `config.trim_text` the final text is trimmed of leading and trailing
/// whitespace.
pub fn extract_text(bytes: &[u8], config: &ConversionConfig) -> String {
    if !looks_like_pdf(bytes) {
        report(config, "input does not start with a PDF header");
    }

    let pages = match pdf_extract::extract_text_by_pages_from_mem(bytes) {
        Ok(pages) => pages,
        Err(e) => {
            report(config, &format!("problem reading the PDF file: {e}"));
            return String::new();
        }
    };

    let mut text = String::new();
    for page in &pages {
        if !page.is_empty() {
            text.push_str(page);
        }
    }
    debug!(pages = pages.len(), chars = text.len(), "extracted text");

    if config.trim_text {
        text.trim().to_string()
    } else {
        text
    }
}

/// Extraction problems are warnings or silence, per configuration.
fn report(config: &ConversionConfig, message: &str) {
    if config.surface_errors {
        warn!("{message}");
    } else {
        debug!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_detection() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn garbage_degrades_to_empty() {
        let config = ConversionConfig::default();
        assert_eq!(extract_text(b"not a pdf at all", &config), "");
        assert_eq!(extract_text(&[0u8; 64], &config), "");
        assert_eq!(extract_text(b"", &config), "");
    }

    #[test]
    fn garbage_degrades_to_empty_silently_too() {
        let config = ConversionConfig::builder()
            .surface_errors(false)
            .build()
            .unwrap();
        assert_eq!(extract_text(b"\x00\x01\x02", &config), "");
    }
}
