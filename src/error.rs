//! Error types for the pdf2media library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2MediaError`] — **Fatal**: the conversion request cannot produce a
//!   downloadable artifact (missing input, exhausted retries, I/O failure).
//!   Returned as `Err(Pdf2MediaError)` from the top-level `convert*`
//!   functions.
//!
//! * [`SpeechError`] — **Backend-level**: a single synthesis attempt or
//!   backend failed. Some variants are not terminal at all:
//!   [`SpeechError::VoiceNotFound`] triggers the cloud fallback, and
//!   [`SpeechError::RateLimited`] is retried with exponential backoff before
//!   it is promoted to [`Pdf2MediaError::RateLimited`].
//!
//! Text extraction deliberately has **no** error type: a document that cannot
//! be read degrades to an empty string (see [`crate::pipeline::extract`]),
//! which the caller surfaces as [`Pdf2MediaError::EmptyText`] only once it
//! tries to convert.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2media library.
///
/// Backend-level synthesis failures use [`SpeechError`] and are resolved
/// (retried, or redirected to the fallback backend) before anything is
/// promoted to a variant here.
#[derive(Debug, Error)]
pub enum Pdf2MediaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The document produced no extractable text, so there is nothing to
    /// convert. Scanned-image-only PDFs end up here.
    #[error("no text found in the document; nothing to convert")]
    EmptyText,

    /// The requested language label is not in the static language table.
    #[error("unknown language '{label}'\nRun with --list-languages to see the supported labels.")]
    UnknownLanguage { label: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The cloud speech service kept answering HTTP 429 until the retry
    /// budget was exhausted. No artifact was produced.
    #[error("speech service rate-limited the request; gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Audio synthesis failed for a non-retryable reason.
    #[error("audio synthesis failed: {detail}")]
    SynthesisFailed { detail: String },

    /// Could not serialise or write a DOC/DOCX/TXT artifact.
    #[error("failed to write {kind} output: {detail}")]
    RenderFailed { kind: &'static str, detail: String },

    /// The produced artifact could not be read back for delivery.
    #[error("failed to read produced artifact '{path}': {source}")]
    DeliveryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failure inside a speech backend.
///
/// Produced by [`crate::pipeline::cloud::CloudTts`] and
/// [`crate::pipeline::local::EspeakEngine`]; consumed by the fallback and
/// retry policies in [`crate::pipeline::speech`] and
/// [`crate::pipeline::cloud`].
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The cloud endpoint answered HTTP 429. Transient; retried with
    /// exponential backoff.
    #[error("speech service returned HTTP 429 (rate limited)")]
    RateLimited,

    /// The cloud endpoint answered with any other non-success status.
    /// Not retried.
    #[error("speech service returned HTTP {status}")]
    Endpoint { status: u16 },

    /// The request never reached the endpoint (DNS, TLS, timeout).
    #[error("speech request failed: {0}")]
    Transport(String),

    /// The local engine exposes no voice tagged with the requested gender.
    /// Not a failure: resolved by falling back to the cloud backend.
    #[error("no installed voice matches the requested gender")]
    VoiceNotFound,

    /// No local synthesis engine could be found on this machine.
    #[error("local speech engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The local engine ran but exited unsuccessfully or wrote no audio.
    #[error("local speech engine failed: {0}")]
    EngineFailed(String),

    /// Temp-file plumbing around a synthesis call failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
