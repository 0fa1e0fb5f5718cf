//! Sanitisation: strip characters the DOCX serialiser cannot carry.
//!
//! PDF extraction happily emits control characters (form feeds between
//! pages, stray NULs from broken encodings) and invisible Unicode (BOM,
//! zero-width joiners, soft hyphens). Word rejects documents containing
//! most of these, so the DOCX path filters the text down to printable
//! characters plus newline and tab before serialisation.

/// Invisible code points that survive `char::is_control` but have no
/// business in a document body.
const INVISIBLE: &[char] = &[
    '\u{00AD}', // soft hyphen
    '\u{200B}', // zero-width space
    '\u{200C}', // zero-width non-joiner
    '\u{200D}', // zero-width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // BOM / zero-width no-break space
];

/// Remove every non-printable character except newline, tab, and space.
///
/// Idempotent: `sanitize(sanitize(x)) == sanitize(x)` for all inputs.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|&c| keep(c)).collect()
}

fn keep(c: char) -> bool {
    match c {
        '\n' | '\t' | ' ' => true,
        c if c.is_control() => false,
        c => !INVISIBLE.contains(&c),
    }
}
