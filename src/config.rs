//! Configuration types for a conversion request.
//!
//! Everything policy-like — error visibility, DOCX sanitisation, the
//! speech backend, retry counts — is an explicit flag on one
//! [`ConversionConfig`], built via its [`ConversionConfigBuilder`].
//! Keeping every knob in one struct makes it trivial to share configs,
//! serialise the interesting parts for logging, and diff two runs to
//! understand why their outputs differ.

use crate::error::Pdf2MediaError;
use crate::language::DEFAULT_LANGUAGE;
use crate::output::OutputKind;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which strategy produces audio artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioBackend {
    /// Call the cloud text-to-speech endpoint directly. (default)
    #[default]
    Cloud,
    /// Try the local synthesis engine first; fall back to the cloud
    /// endpoint (with language fixed to English) when no suitable voice
    /// exists.
    LocalWithFallback,
}

/// Requested voice gender for the local engine.
///
/// `Unspecified` uses the engine's default voice. Selection goes by the
/// engine's own gender tags — the first voice tagged with the requested
/// gender wins — rather than by platform-specific voice names, which do
/// not travel between machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoiceGender {
    #[default]
    Unspecified,
    Male,
    Female,
}

/// Speaking rate for the local engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoiceRate {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl VoiceRate {
    /// Engine rate value in words per minute.
    pub fn words_per_minute(self) -> u32 {
        match self {
            VoiceRate::Slow => 100,
            VoiceRate::Normal => 150,
            VoiceRate::Fast => 240,
        }
    }
}

/// Configuration for one conversion request.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2media::{ConversionConfig, OutputKind, VoiceGender};
///
/// let config = ConversionConfig::builder()
///     .output(OutputKind::Mp3)
///     .language("en")
///     .voice_gender(VoiceGender::Female)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Requested output format. Default: [`OutputKind::Txt`].
    pub output: OutputKind,

    /// Audio strategy. Ignored for document outputs. Default: cloud.
    pub backend: AudioBackend,

    /// Requested voice gender (local engine only). Default: unspecified.
    pub voice_gender: VoiceGender,

    /// Requested speaking rate (local engine only). Default: normal.
    pub voice_rate: VoiceRate,

    /// Language code for the cloud backend, e.g. "en", "hi". Resolved from
    /// a display label with [`crate::language::resolve_selection`]. The
    /// local engine ignores it. Default: [`crate::language::DEFAULT_LANGUAGE`].
    pub language: String,

    /// Strip non-printable characters before DOCX serialisation.
    /// Default: true.
    ///
    /// Control characters in extracted PDF text produce DOCX files Word
    /// refuses to open.
    pub sanitize: bool,

    /// Trim leading/trailing whitespace from extracted text. Default: true.
    pub trim_text: bool,

    /// Surface extraction problems as user-visible warnings. When false,
    /// extraction degrades to empty text silently. Default: true.
    pub surface_errors: bool,

    /// Total cloud synthesis attempts when the service rate-limits.
    /// Default: 5.
    ///
    /// Attempt `n` failing with HTTP 429 sleeps `2^n` backoff units before
    /// the next try, so the default waits 2, 4, 8, 16 units between its
    /// five attempts. Any other failure aborts on the first attempt.
    pub max_attempts: u32,

    /// One backoff unit. Default: 1s.
    pub backoff_unit: Duration,

    /// Delay between synthetic progress ticks. Default: 100ms.
    ///
    /// The heartbeat is a UX signal, not a measurement: eleven ticks
    /// (0, 10, …, 100) regardless of how long conversion really takes.
    pub heartbeat_interval: Duration,

    /// Per-call timeout for the cloud endpoint in seconds. Default: 30.
    pub api_timeout_secs: u64,

    /// Override the cloud TTS endpoint URL. `None` uses the public
    /// Google Translate endpoint.
    pub endpoint_url: Option<String>,

    /// Observer for progress ticks. `None` means no progress reporting.
    pub progress: Option<Progress>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output: OutputKind::Txt,
            backend: AudioBackend::Cloud,
            voice_gender: VoiceGender::Unspecified,
            voice_rate: VoiceRate::Normal,
            language: DEFAULT_LANGUAGE.to_string(),
            sanitize: true,
            trim_text: true,
            surface_errors: true,
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
            heartbeat_interval: Duration::from_millis(100),
            api_timeout_secs: 30,
            endpoint_url: None,
            progress: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output", &self.output)
            .field("backend", &self.backend)
            .field("voice_gender", &self.voice_gender)
            .field("voice_rate", &self.voice_rate)
            .field("language", &self.language)
            .field("sanitize", &self.sanitize)
            .field("trim_text", &self.trim_text)
            .field("surface_errors", &self.surface_errors)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_unit", &self.backoff_unit)
            .field("endpoint_url", &self.endpoint_url)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ProgressObserver>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output(mut self, kind: OutputKind) -> Self {
        self.config.output = kind;
        self
    }

    pub fn backend(mut self, backend: AudioBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn voice_gender(mut self, gender: VoiceGender) -> Self {
        self.config.voice_gender = gender;
        self
    }

    pub fn voice_rate(mut self, rate: VoiceRate) -> Self {
        self.config.voice_rate = rate;
        self
    }

    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.config.language = code.into();
        self
    }

    pub fn sanitize(mut self, v: bool) -> Self {
        self.config.sanitize = v;
        self
    }

    pub fn trim_text(mut self, v: bool) -> Self {
        self.config.trim_text = v;
        self
    }

    pub fn surface_errors(mut self, v: bool) -> Self {
        self.config.surface_errors = v;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn backoff_unit(mut self, unit: Duration) -> Self {
        self.config.backoff_unit = unit;
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = Some(url.into());
        self
    }

    pub fn progress(mut self, observer: Progress) -> Self {
        self.config.progress = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MediaError> {
        let c = &self.config;
        if c.max_attempts == 0 {
            return Err(Pdf2MediaError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.language.is_empty() {
            return Err(Pdf2MediaError::InvalidConfig(
                "language code must not be empty".into(),
            ));
        }
        if let Some(ref url) = c.endpoint_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Pdf2MediaError::InvalidConfig(format!(
                    "endpoint_url must be an HTTP(S) URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}
