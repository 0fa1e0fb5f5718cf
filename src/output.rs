//! Output types: the format table, temp-file artifacts, and delivery.
//!
//! ## Artifact ownership
//!
//! A conversion produces its result as a temporary file on disk. The
//! [`Artifact`] type owns that file through a [`tempfile::TempPath`], so the
//! file is removed exactly once no matter which path the request takes:
//! [`Artifact::deliver`] reads the bytes and closes the path explicitly, and
//! an artifact that is dropped on an error path (or during a panic) removes
//! its file via the `TempPath` drop. Callers never see a path to a partial
//! or already-deleted file.

use crate::error::Pdf2MediaError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

/// The output formats a conversion can produce.
///
/// The mime values are the ones the download layer advertises, including
/// the nonstandard `audio/mp3` (the registered type is `audio/mpeg`, but
/// the advertised value is part of the observable contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// MPEG audio. The cloud backend produces true MP3 frames; the local
    /// engine writes WAV data whatever the suffix says.
    Mp3,
    /// Waveform audio.
    Wav,
    /// Legacy Word document. Written as plain UTF-8 text with a `.doc`
    /// suffix; Word opens it.
    Doc,
    /// Office Open XML document: a single paragraph holding the text.
    Docx,
    /// Plain UTF-8 text.
    Txt,
}

impl OutputKind {
    /// Mime value advertised for the download.
    pub fn mime(self) -> &'static str {
        match self {
            OutputKind::Mp3 => "audio/mp3",
            OutputKind::Wav => "audio/wav",
            OutputKind::Doc => "application/msword",
            OutputKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputKind::Txt => "text/plain",
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Mp3 => "mp3",
            OutputKind::Wav => "wav",
            OutputKind::Doc => "doc",
            OutputKind::Docx => "docx",
            OutputKind::Txt => "txt",
        }
    }

    /// Whether this kind goes through the audio path.
    pub fn is_audio(self) -> bool {
        matches!(self, OutputKind::Mp3 | OutputKind::Wav)
    }

    /// Download file name: `converted.<ext>`.
    pub fn download_name(self) -> String {
        format!("converted.{}", self.extension())
    }
}

/// A fully-written temporary file holding converted output.
///
/// Owned exclusively by the converter until handed to [`Artifact::deliver`].
/// Dropping an undelivered artifact removes the file.
#[derive(Debug)]
pub struct Artifact {
    path: TempPath,
    kind: OutputKind,
}

impl Artifact {
    pub(crate) fn new(path: TempPath, kind: OutputKind) -> Self {
        Self { path, kind }
    }

    /// Open a fresh temp file carrying this kind's suffix.
    pub(crate) fn tempfile(kind: OutputKind) -> std::io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix("pdf2media-")
            .suffix(&format!(".{}", kind.extension()))
            .tempfile()
    }

    /// Write `bytes` to a fresh temp file and wrap it as an artifact.
    ///
    /// Public so custom [`crate::pipeline::speech::SpeechSynthesizer`]
    /// implementations can produce artifacts.
    pub fn from_bytes(bytes: &[u8], kind: OutputKind) -> std::io::Result<Self> {
        let mut file = Self::tempfile(kind)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self::new(file.into_temp_path(), kind))
    }

    /// Path of the temp file. Valid until the artifact is delivered or
    /// dropped.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Read the artifact fully into memory, delete the temp file, and
    /// return the downloadable payload.
    pub fn deliver(self) -> Result<Delivery, Pdf2MediaError> {
        let bytes = std::fs::read(&self.path).map_err(|source| Pdf2MediaError::DeliveryFailed {
            path: self.path.to_path_buf(),
            source,
        })?;
        // Errors removing an already-read temp file are not worth failing
        // the download over; the TempPath would retry on drop anyway.
        let kind = self.kind;
        if let Err(e) = self.path.close() {
            tracing::warn!("could not remove temp artifact: {e}");
        }
        Ok(Delivery {
            file_name: kind.download_name(),
            mime: kind.mime(),
            kind,
            bytes,
        })
    }
}

/// The downloadable payload handed to the caller.
///
/// By the time a `Delivery` exists, the temporary artifact behind it has
/// already been deleted.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Generated download name, `converted.<ext>`.
    pub file_name: String,
    /// Mime value from the format table.
    pub mime: &'static str,
    pub kind: OutputKind,
    /// The complete converted output.
    pub bytes: Vec<u8>,
}

/// Timing and provenance counters for one conversion request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    /// Time spent extracting text, or 0 when the caller supplied text
    /// directly or the session cache answered.
    pub extract_ms: u64,
    /// Time spent producing the artifact.
    pub convert_ms: u64,
    /// Whole-request wall clock.
    pub total_ms: u64,
    /// Which speech backend produced an audio artifact
    /// (`"cloud"`, `"local"`, or `"cloud-fallback"`); `None` for
    /// document outputs.
    pub backend: Option<&'static str>,
    /// Size of the delivered payload.
    pub output_bytes: usize,
    /// Whether extraction was answered from the session cache.
    pub from_cache: bool,
}

/// Everything a successful conversion returns.
#[derive(Debug)]
pub struct ConversionOutput {
    pub delivery: Delivery,
    pub stats: ConversionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_table() {
        assert_eq!(OutputKind::Mp3.mime(), "audio/mp3");
        assert_eq!(OutputKind::Wav.mime(), "audio/wav");
        assert_eq!(OutputKind::Doc.mime(), "application/msword");
        assert_eq!(
            OutputKind::Docx.mime(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(OutputKind::Txt.mime(), "text/plain");
    }

    #[test]
    fn download_names() {
        assert_eq!(OutputKind::Txt.download_name(), "converted.txt");
        assert_eq!(OutputKind::Docx.download_name(), "converted.docx");
    }

    #[test]
    fn audio_kinds() {
        assert!(OutputKind::Mp3.is_audio());
        assert!(OutputKind::Wav.is_audio());
        assert!(!OutputKind::Doc.is_audio());
        assert!(!OutputKind::Docx.is_audio());
        assert!(!OutputKind::Txt.is_audio());
    }

    #[test]
    fn artifact_file_removed_after_delivery() {
        let artifact = Artifact::from_bytes(b"hello", OutputKind::Txt).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());

        let delivery = artifact.deliver().unwrap();
        assert_eq!(delivery.bytes, b"hello");
        assert_eq!(delivery.mime, "text/plain");
        assert_eq!(delivery.file_name, "converted.txt");
        assert!(!path.exists(), "temp artifact must be deleted on delivery");
    }

    #[test]
    fn artifact_file_removed_on_drop() {
        let artifact = Artifact::from_bytes(b"orphan", OutputKind::Wav).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists(), "temp artifact must be deleted on drop");
    }
}
