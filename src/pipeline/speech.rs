//! The speech-synthesis capability and the local-to-cloud fallback policy.
//!
//! Both audio strategies implement one trait,
//! `synthesize(request) -> artifact | failure`, so the rest of the
//! pipeline does not care which engine produced the file. The policy layer
//! here is the only place that knows the fallback rule: a local engine
//! that cannot serve the requested voice hands the request to the cloud
//! backend with the language pinned to English — whatever language the
//! user selected, because the local path never exposed a language choice
//! to begin with.

use crate::config::{VoiceGender, VoiceRate};
use crate::error::SpeechError;
use crate::output::{Artifact, OutputKind};
use async_trait::async_trait;
use tracing::warn;

/// Language the cloud fallback always uses.
pub const FALLBACK_LANGUAGE: &str = crate::language::DEFAULT_LANGUAGE;

/// One synthesis request.
#[derive(Debug, Clone, Copy)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    /// Cloud language code. The local engine ignores it.
    pub language: &'a str,
    pub gender: VoiceGender,
    pub rate: VoiceRate,
    /// [`OutputKind::Mp3`] or [`OutputKind::Wav`]; decides the artifact
    /// suffix.
    pub kind: OutputKind,
}

/// Capability of turning text into an audio artifact.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `request.text` into a fully-written temp file.
    ///
    /// On failure no artifact is returned and no partially-written file
    /// remains reachable by the caller.
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Artifact, SpeechError>;
}

/// Which backend ended up producing an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendUsed {
    Cloud,
    Local,
    /// The local engine could not serve the request and the cloud backend
    /// took over.
    CloudFallback,
}

impl BackendUsed {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendUsed::Cloud => "cloud",
            BackendUsed::Local => "local",
            BackendUsed::CloudFallback => "cloud-fallback",
        }
    }
}

/// Try the local engine; fall back to the cloud backend when it cannot
/// serve the request.
///
/// Fallback triggers on [`SpeechError::VoiceNotFound`] (the defined policy:
/// no installed voice matches the requested gender) and on
/// [`SpeechError::EngineUnavailable`] (no engine on this machine at all —
/// the request is equally unservable locally). The fallback request always
/// carries [`FALLBACK_LANGUAGE`]. Every other local failure is terminal.
pub async fn synthesize_with_fallback(
    local: &dyn SpeechSynthesizer,
    cloud: &dyn SpeechSynthesizer,
    request: &SpeechRequest<'_>,
) -> Result<(Artifact, BackendUsed), SpeechError> {
    match local.synthesize(request).await {
        Ok(artifact) => Ok((artifact, BackendUsed::Local)),
        Err(SpeechError::VoiceNotFound) => {
            warn!("no installed voice matches the requested gender; using cloud synthesis");
            cloud_fallback(cloud, request).await
        }
        Err(SpeechError::EngineUnavailable(reason)) => {
            warn!(%reason, "local speech engine unavailable; using cloud synthesis");
            cloud_fallback(cloud, request).await
        }
        Err(e) => Err(e),
    }
}

async fn cloud_fallback(
    cloud: &dyn SpeechSynthesizer,
    request: &SpeechRequest<'_>,
) -> Result<(Artifact, BackendUsed), SpeechError> {
    let fallback = SpeechRequest {
        language: FALLBACK_LANGUAGE,
        ..*request
    };
    let artifact = cloud.synthesize(&fallback).await?;
    Ok((artifact, BackendUsed::CloudFallback))
}
