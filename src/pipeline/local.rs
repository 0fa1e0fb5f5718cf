//! Local speech backend: espeak-ng driven as a subprocess.
//!
//! ## Why a subprocess?
//!
//! Speech engines with a file-output mode are platform libraries with
//! heavyweight bindings; espeak-ng is installed practically everywhere,
//! lists its voices with gender tags, and writes WAV straight to a path
//! with `-w`. Driving the binary keeps the backend portable and keeps this
//! crate free of platform audio FFI.
//!
//! Voice selection goes by the engine's own gender tags — the first voice
//! tagged with the requested gender wins — never by voice name, which
//! does not travel between machines. No match is reported as
//! [`SpeechError::VoiceNotFound`], which the policy layer in
//! [`crate::pipeline::speech`] resolves by falling back to the cloud
//! backend.

use crate::config::VoiceGender;
use crate::error::SpeechError;
use crate::output::Artifact;
use crate::pipeline::speech::{SpeechRequest, SpeechSynthesizer};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Binaries probed for, in order.
const ENGINE_NAMES: &[&str] = &["espeak-ng", "espeak"];

/// One voice from the engine's `--voices` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Display name ("English (Great Britain)").
    pub name: String,
    /// Language tag ("en-gb").
    pub language: String,
    /// Identifier usable with `-v` ("gmw/en-GB").
    pub identifier: String,
    /// Gender tag, when the listing carries one.
    pub gender: Option<VoiceGender>,
}

/// The espeak-ng backend.
pub struct EspeakEngine {
    program: PathBuf,
}

impl EspeakEngine {
    /// Locate an engine binary on PATH.
    pub fn detect() -> Result<Self, SpeechError> {
        for name in ENGINE_NAMES {
            if let Ok(program) = which::which(name) {
                debug!(program = %program.display(), "local speech engine found");
                return Ok(Self { program });
            }
        }
        Err(SpeechError::EngineUnavailable(format!(
            "none of {ENGINE_NAMES:?} found in PATH"
        )))
    }

    /// The engine's installed voices.
    pub async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(SpeechError::EngineFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Pick the `-v` identifier for the request, if one is needed.
    async fn select_voice(&self, gender: VoiceGender) -> Result<Option<String>, SpeechError> {
        if gender == VoiceGender::Unspecified {
            // Engine default voice; no language parameter is exposed on
            // the local path.
            return Ok(None);
        }
        let voices = self.voices().await?;
        let voice = pick_voice(&voices, gender).ok_or(SpeechError::VoiceNotFound)?;
        info!(voice = %voice.name, "selected local voice");
        Ok(Some(voice.identifier.clone()))
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakEngine {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Artifact, SpeechError> {
        let voice = self.select_voice(request.gender).await?;

        // The engine takes its input from a file; piping large texts
        // through argv runs into platform argument-length limits.
        let mut text_file = tempfile::NamedTempFile::new()?;
        text_file.write_all(request.text.as_bytes())?;
        text_file.flush()?;

        let out_file = Artifact::tempfile(request.kind)?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("-s")
            .arg(request.rate.words_per_minute().to_string())
            .arg("-w")
            .arg(out_file.path())
            .arg("-f")
            .arg(text_file.path())
            .stdin(Stdio::null());
        if let Some(ref v) = voice {
            cmd.arg("-v").arg(v);
        }

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(SpeechError::EngineFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let written = out_file.as_file().metadata()?.len();
        if written == 0 {
            return Err(SpeechError::EngineFailed(
                "engine exited successfully but wrote no audio".into(),
            ));
        }
        debug!(bytes = written, "local synthesis complete");
        Ok(Artifact::new(out_file.into_temp_path(), request.kind))
    }
}

/// Parse the engine's `--voices` table.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
///  5  en-gb           --/M      English (Great Britain) gmw/en
/// ```
///
/// The gender lives in the trailing letter of the Age/Gender column;
/// voices without one parse as `None`.
pub fn parse_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1) // header row
        .filter_map(parse_voice_line)
        .collect()
}

fn parse_voice_line(line: &str) -> Option<Voice> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < 5 {
        return None;
    }
    let language = columns[1].to_string();
    let gender = match columns[2].chars().last() {
        Some('M') => Some(VoiceGender::Male),
        Some('F') => Some(VoiceGender::Female),
        _ => None,
    };
    // VoiceName may contain spaces; the identifier is the second-to-last
    // meaningful column only when no "Other Languages" are listed, so take
    // everything between the gender column and the column that looks like
    // a file path.
    let identifier = columns
        .iter()
        .skip(3)
        .find(|c| c.contains('/'))?
        .to_string();
    let name_end = columns.iter().position(|c| *c == identifier.as_str())?;
    let name = columns[3..name_end].join(" ");
    if name.is_empty() {
        return None;
    }
    Some(Voice {
        name,
        language,
        identifier,
        gender,
    })
}

/// First voice tagged with the requested gender.
pub fn pick_voice(voices: &[Voice], gender: VoiceGender) -> Option<&Voice> {
    match gender {
        VoiceGender::Unspecified => voices.first(),
        wanted => voices.iter().find(|v| v.gender == Some(wanted)),
    }
}
