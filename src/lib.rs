//! # pdf2media
//!
//! Convert PDF documents to audio (MP3/WAV) or DOC/DOCX/TXT files.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   per-page text, concatenated; degrades to "" on failure
//!  ├─ 2. Convert   audio (cloud TTS or local engine) or document render
//!  ├─ 3. Heartbeat fixed 0–100% ticks from a background timer
//!  └─ 4. Deliver   bytes + mime + `converted.<ext>`, temp file deleted
//! ```
//!
//! Everything policy-like — error visibility, DOCX sanitisation, which
//! speech backend runs, session caching, language selection — is
//! configuration on one pipeline; see [`ConversionConfig`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2media::{convert_document, ConversionConfig, OutputKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .output(OutputKind::Mp3)
//!         .language("en")
//!         .build()?;
//!     let output = convert_document("document.pdf", &config).await?;
//!     std::fs::write(&output.delivery.file_name, &output.delivery.bytes)?;
//!     eprintln!("wrote {} ({} bytes)",
//!         output.delivery.file_name,
//!         output.stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Audio backends
//!
//! | Backend | Engine | Language | Fallback |
//! |---------|--------|----------|----------|
//! | `Cloud` (default) | Google Translate TTS route | from config | — |
//! | `LocalWithFallback` | espeak-ng subprocess | engine default | cloud, pinned to "en" |
//!
//! The cloud backend retries HTTP 429 with exponential backoff (five
//! attempts, waiting 2/4/8/16 backoff units in between); everything else
//! fails fast. The local backend picks the first installed voice tagged
//! with the requested gender and falls back to the cloud when none
//! matches.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2media` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2media = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    AudioBackend, ConversionConfig, ConversionConfigBuilder, VoiceGender, VoiceRate,
};
pub use convert::{
    convert, convert_document, convert_document_sync, convert_with_session, extract_text,
};
pub use error::{Pdf2MediaError, SpeechError};
pub use output::{Artifact, ConversionOutput, ConversionStats, Delivery, OutputKind};
pub use pipeline::sanitize::sanitize;
pub use pipeline::speech::{BackendUsed, SpeechRequest, SpeechSynthesizer};
pub use progress::{Heartbeat, NoopProgress, Progress, ProgressObserver};
pub use session::SessionCache;
