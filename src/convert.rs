//! Eager conversion entry points.
//!
//! The pipeline is deliberately request-per-action: one upload, one
//! extraction, one conversion, one delivery, run to completion before the
//! interface becomes responsive again. The only background work is the
//! synthetic progress heartbeat. [`convert_document`] is the whole flow;
//! [`convert`] starts from already-extracted text (what a UI does after
//! showing the preview pane); [`convert_with_session`] adds the
//! extraction cache.

use crate::config::{AudioBackend, ConversionConfig};
use crate::error::{Pdf2MediaError, SpeechError};
use crate::output::{ConversionOutput, ConversionStats, OutputKind};
use crate::pipeline::cloud::CloudTts;
use crate::pipeline::local::EspeakEngine;
use crate::pipeline::speech::{
    synthesize_with_fallback, BackendUsed, SpeechRequest, SpeechSynthesizer, FALLBACK_LANGUAGE,
};
use crate::pipeline::{extract, render};
use crate::progress::{Heartbeat, NoopProgress, Progress};
use crate::session::SessionCache;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert already-extracted text into the configured output format.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`Pdf2MediaError::EmptyText`] when there is nothing to convert
/// - [`Pdf2MediaError::RateLimited`] when the cloud backend exhausted its
///   retry budget
/// - [`Pdf2MediaError::SynthesisFailed`] / [`Pdf2MediaError::RenderFailed`]
///   for terminal conversion failures
///
/// On any error no temporary file remains on disk.
pub async fn convert(
    text: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MediaError> {
    let total_start = Instant::now();
    if text.trim().is_empty() {
        return Err(Pdf2MediaError::EmptyText);
    }

    let progress: Progress = config
        .progress
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgress));
    let heartbeat = Heartbeat::start(
        progress,
        heartbeat_label(config.output),
        config.heartbeat_interval,
    );

    let convert_start = Instant::now();
    let (artifact, backend) = if config.output.is_audio() {
        let (artifact, backend) = synthesize_audio(text, config).await?;
        (artifact, Some(backend.as_str()))
    } else {
        (render::render(text, config)?, None)
    };
    let convert_ms = convert_start.elapsed().as_millis() as u64;

    heartbeat.finish("Conversion complete");

    let delivery = artifact.deliver()?;
    info!(
        kind = ?config.output,
        bytes = delivery.bytes.len(),
        convert_ms,
        "conversion complete"
    );

    Ok(ConversionOutput {
        stats: ConversionStats {
            extract_ms: 0,
            convert_ms,
            total_ms: total_start.elapsed().as_millis() as u64,
            backend,
            output_bytes: delivery.bytes.len(),
            from_cache: false,
        },
        delivery,
    })
}

/// Convert a PDF file on disk: extract, then [`convert`].
pub async fn convert_document(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MediaError> {
    let path = input.as_ref();
    info!("starting conversion: {}", path.display());
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| Pdf2MediaError::FileNotFound {
            path: path.to_path_buf(),
        })?;

    let extract_start = Instant::now();
    let text = extract_blocking(bytes, config).await?;
    let extract_ms = extract_start.elapsed().as_millis() as u64;

    let mut output = convert(&text, config).await?;
    output.stats.extract_ms = extract_ms;
    output.stats.total_ms += extract_ms;
    Ok(output)
}

/// Convert uploaded bytes, answering extraction from the session cache
/// when `key` still identifies the current upload.
pub async fn convert_with_session(
    cache: &mut SessionCache,
    key: &str,
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MediaError> {
    let extract_start = Instant::now();
    let (text, from_cache) = crate::session::extract_cached(cache, key, bytes, config);
    let extract_ms = extract_start.elapsed().as_millis() as u64;

    let mut output = convert(&text, config).await?;
    output.stats.extract_ms = extract_ms;
    output.stats.from_cache = from_cache;
    Ok(output)
}

/// Synchronous wrapper around [`convert_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_document_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MediaError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2MediaError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert_document(input, config))
}

/// Extract text from PDF bytes without converting anything.
///
/// Degrades to an empty string on unreadable input; see
/// [`crate::pipeline::extract::extract_text`].
pub fn extract_text(bytes: &[u8], config: &ConversionConfig) -> String {
    extract::extract_text(bytes, config)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// pdf parsing is CPU-bound; keep it off the async threads.
async fn extract_blocking(
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> Result<String, Pdf2MediaError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || extract::extract_text(&bytes, &config))
        .await
        .map_err(|e| Pdf2MediaError::Internal(format!("extraction task panicked: {e}")))
}

fn heartbeat_label(kind: OutputKind) -> &'static str {
    match kind {
        OutputKind::Mp3 | OutputKind::Wav => "Converting text to audio",
        OutputKind::Doc => "Saving DOC file",
        OutputKind::Docx => "Saving DOCX file",
        OutputKind::Txt => "Saving TXT file",
    }
}

/// Run the configured audio strategy.
async fn synthesize_audio(
    text: &str,
    config: &ConversionConfig,
) -> Result<(crate::output::Artifact, BackendUsed), Pdf2MediaError> {
    let request = SpeechRequest {
        text,
        language: &config.language,
        gender: config.voice_gender,
        rate: config.voice_rate,
        kind: config.output,
    };
    let cloud = CloudTts::from_config(config)?;

    match config.backend {
        AudioBackend::Cloud => cloud
            .synthesize(&request)
            .await
            .map(|a| (a, BackendUsed::Cloud))
            .map_err(|e| promote(e, config)),
        AudioBackend::LocalWithFallback => match EspeakEngine::detect() {
            Ok(local) => synthesize_with_fallback(&local, &cloud, &request)
                .await
                .map_err(|e| promote(e, config)),
            Err(SpeechError::EngineUnavailable(reason)) => {
                warn!(%reason, "local speech engine unavailable; using cloud synthesis");
                let fallback = SpeechRequest {
                    language: FALLBACK_LANGUAGE,
                    ..request
                };
                cloud
                    .synthesize(&fallback)
                    .await
                    .map(|a| (a, BackendUsed::CloudFallback))
                    .map_err(|e| promote(e, config))
            }
            Err(e) => Err(promote(e, config)),
        },
    }
}

/// Promote a backend-level failure to the fatal error type.
fn promote(e: SpeechError, config: &ConversionConfig) -> Pdf2MediaError {
    match e {
        SpeechError::RateLimited => Pdf2MediaError::RateLimited {
            attempts: config.max_attempts,
        },
        other => Pdf2MediaError::SynthesisFailed {
            detail: other.to_string(),
        },
    }
}
