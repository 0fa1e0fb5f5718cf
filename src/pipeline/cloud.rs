//! Cloud text-to-speech backend with the rate-limit retry loop.
//!
//! ## Retry Strategy
//!
//! The public endpoint throttles aggressively: HTTP 429 is an everyday
//! answer, not an exceptional one. A 429 is retried up to
//! `max_attempts` total attempts, sleeping `2^attempt` backoff units after
//! failing attempt `attempt` — with the default five attempts and a
//! one-second unit the waits form the sequence 2 s, 4 s, 8 s, 16 s. Any
//! other failure aborts on the spot; a wrong language code or a 5xx does
//! not get better by waiting.
//!
//! The HTTP transport sits behind [`TtsEndpoint`] so the retry policy is
//! testable without a network (and without real sleeps — the tests run
//! under tokio's paused clock).

use crate::config::ConversionConfig;
use crate::error::{Pdf2MediaError, SpeechError};
use crate::output::Artifact;
use crate::pipeline::speech::{SpeechRequest, SpeechSynthesizer};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Public endpoint the gTTS ecosystem uses.
pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects queries beyond this many characters, so longer
/// texts are synthesized in chunks and the MP3 frames concatenated.
pub const MAX_CHUNK_CHARS: usize = 200;

/// One HTTP round trip to a text-to-speech service.
#[async_trait]
pub trait TtsEndpoint: Send + Sync {
    /// Fetch synthesized audio for one chunk of text.
    async fn fetch(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError>;
}

/// The production endpoint: Google Translate's TTS route.
pub struct GoogleTranslateEndpoint {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Pdf2MediaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Pdf2MediaError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl TtsEndpoint for GoogleTranslateEndpoint {
    async fn fetch(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SpeechError::RateLimited);
        }
        if !status.is_success() {
            return Err(SpeechError::Endpoint {
                status: status.as_u16(),
            });
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| SpeechError::Transport(e.to_string()))
    }
}

/// Cloud synthesis strategy: chunk, fetch, retry on 429, write artifact.
pub struct CloudTts {
    endpoint: Arc<dyn TtsEndpoint>,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl CloudTts {
    pub fn new(endpoint: Arc<dyn TtsEndpoint>, max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            endpoint,
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Build against the production endpoint (or the configured override).
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Pdf2MediaError> {
        let base_url = config
            .endpoint_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = GoogleTranslateEndpoint::new(
            base_url,
            Duration::from_secs(config.api_timeout_secs),
        )?;
        Ok(Self::new(
            Arc::new(endpoint),
            config.max_attempts,
            config.backoff_unit,
        ))
    }

    /// Synthesize the whole text once: every chunk must succeed.
    async fn fetch_document(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        debug!(chunks = chunks.len(), language, "cloud synthesis");
        let mut audio = Vec::new();
        for chunk in &chunks {
            // The endpoint returns raw MP3 frames, so chunk responses
            // concatenate into one playable stream.
            audio.extend(self.endpoint.fetch(chunk, language).await?);
        }
        Ok(audio)
    }
}

#[async_trait]
impl SpeechSynthesizer for CloudTts {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Artifact, SpeechError> {
        for attempt in 1..=self.max_attempts {
            match self.fetch_document(request.text, request.language).await {
                Ok(audio) => {
                    let artifact = Artifact::from_bytes(&audio, request.kind)?;
                    debug!(bytes = audio.len(), attempt, "cloud synthesis complete");
                    return Ok(artifact);
                }
                Err(SpeechError::RateLimited) if attempt < self.max_attempts => {
                    let delay = self.backoff_unit * 2u32.pow(attempt);
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        ?delay,
                        "speech service rate-limited; backing off"
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
        // The final attempt always returns above; max_attempts ≥ 1.
        Err(SpeechError::RateLimited)
    }
}

/// Split `text` into whitespace-respecting chunks of at most `max_chars`
/// characters.
///
/// A single word longer than `max_chars` is split mid-word; the endpoint
/// cannot take it whole either way.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut piece = String::new();
            for (i, c) in word.chars().enumerate() {
                if i > 0 && i % max_chars == 0 {
                    chunks.push(std::mem::take(&mut piece));
                }
                piece.push(c);
            }
            if !piece.is_empty() {
                chunks.push(piece);
            }
            continue;
        }

        // +1 for the separating space
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
