//! Document rendering: text → DOC / DOCX / TXT artifacts.
//!
//! DOC and TXT are the text verbatim, UTF-8 encoded — the `.doc` flavour
//! relies on Word accepting plain text under that extension. DOCX is a
//! minimal Office Open XML package
//! holding one paragraph, built with `docx-rs`; the sanitisation pass runs
//! first (when configured) because control characters make Word reject the
//! package.

use crate::config::ConversionConfig;
use crate::error::Pdf2MediaError;
use crate::output::{Artifact, OutputKind};
use crate::pipeline::sanitize::sanitize;
use docx_rs::{Docx, Paragraph, Run};
use tracing::debug;

/// Serialise `text` to a temp artifact of the requested kind.
///
/// Only document kinds are accepted; audio kinds belong to the speech
/// path.
pub fn render(text: &str, config: &ConversionConfig) -> Result<Artifact, Pdf2MediaError> {
    match config.output {
        OutputKind::Doc | OutputKind::Txt => render_plain(text, config.output),
        OutputKind::Docx => render_docx(text, config),
        kind => Err(Pdf2MediaError::Internal(format!(
            "render called with audio kind {kind:?}"
        ))),
    }
}

fn render_plain(text: &str, kind: OutputKind) -> Result<Artifact, Pdf2MediaError> {
    let artifact =
        Artifact::from_bytes(text.as_bytes(), kind).map_err(|e| Pdf2MediaError::RenderFailed {
            kind: kind.extension(),
            detail: e.to_string(),
        })?;
    debug!(bytes = text.len(), ?kind, "plain-text artifact written");
    Ok(artifact)
}

fn render_docx(text: &str, config: &ConversionConfig) -> Result<Artifact, Pdf2MediaError> {
    let body = if config.sanitize {
        sanitize(text)
    } else {
        text.to_string()
    };

    let fail = |detail: String| Pdf2MediaError::RenderFailed {
        kind: "docx",
        detail,
    };

    let mut file = Artifact::tempfile(OutputKind::Docx).map_err(|e| fail(e.to_string()))?;
    Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(body)))
        .build()
        .pack(file.as_file_mut())
        .map_err(|e| fail(e.to_string()))?;

    debug!("docx artifact written");
    Ok(Artifact::new(file.into_temp_path(), OutputKind::Docx))
}
