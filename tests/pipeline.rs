//! Integration tests for the conversion pipeline.
//!
//! Everything here runs without a network and without installed voices:
//! the cloud backend is exercised through a scripted [`TtsEndpoint`] under
//! tokio's paused clock (so the backoff sequence is asserted in virtual
//! time), and the fallback policy through mock synthesizers. The
//! extraction tests assemble a small but well-formed PDF in memory.

use async_trait::async_trait;
use pdf2media::pipeline::cloud::{chunk_text, CloudTts, TtsEndpoint, MAX_CHUNK_CHARS};
use pdf2media::pipeline::speech::{
    synthesize_with_fallback, BackendUsed, SpeechRequest, SpeechSynthesizer,
};
use pdf2media::{
    convert, sanitize, Artifact, ConversionConfig, OutputKind, Pdf2MediaError, SessionCache,
    SpeechError, VoiceGender, VoiceRate,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn request(kind: OutputKind) -> SpeechRequest<'static> {
    SpeechRequest {
        text: "hello world",
        language: "ta",
        gender: VoiceGender::Female,
        rate: VoiceRate::Normal,
        kind,
    }
}

/// A TTS endpoint that answers from a queue; once the queue is empty it
/// keeps answering with the sticky default.
struct ScriptedEndpoint {
    calls: AtomicU32,
    script: Mutex<VecDeque<Result<Vec<u8>, SpeechError>>>,
    default: fn() -> Result<Vec<u8>, SpeechError>,
}

impl ScriptedEndpoint {
    fn new(
        script: Vec<Result<Vec<u8>, SpeechError>>,
        default: fn() -> Result<Vec<u8>, SpeechError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            script: Mutex::new(script.into()),
            default,
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsEndpoint for ScriptedEndpoint {
    async fn fetch(&self, _text: &str, _language: &str) -> Result<Vec<u8>, SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => (self.default)(),
        }
    }
}

fn always_rate_limited() -> Result<Vec<u8>, SpeechError> {
    Err(SpeechError::RateLimited)
}

fn always_audio() -> Result<Vec<u8>, SpeechError> {
    Ok(b"ID3fakeaudio".to_vec())
}

// ── Cloud retry policy ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn rate_limiting_exhausts_after_exactly_five_attempts() {
    let endpoint = ScriptedEndpoint::new(vec![], always_rate_limited);
    let tts = CloudTts::new(endpoint.clone(), 5, Duration::from_secs(1));

    let start = tokio::time::Instant::now();
    let result = tts.synthesize(&request(OutputKind::Mp3)).await;

    assert!(matches!(result, Err(SpeechError::RateLimited)));
    assert_eq!(endpoint.calls(), 5, "a sixth attempt must never occur");
    // Backoff between attempts: 2 + 4 + 8 + 16 units.
    assert_eq!(start.elapsed(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn non_rate_limit_failure_aborts_on_first_attempt() {
    let endpoint = ScriptedEndpoint::new(vec![Err(SpeechError::Endpoint { status: 500 })], || {
        panic!("no retry expected after a non-429 failure")
    });
    let tts = CloudTts::new(endpoint.clone(), 5, Duration::from_secs(1));

    let start = tokio::time::Instant::now();
    let result = tts.synthesize(&request(OutputKind::Mp3)).await;

    assert!(matches!(result, Err(SpeechError::Endpoint { status: 500 })));
    assert_eq!(endpoint.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO, "no backoff on hard failure");
}

#[tokio::test(start_paused = true)]
async fn rate_limit_then_success_recovers() {
    let endpoint = ScriptedEndpoint::new(
        vec![Err(SpeechError::RateLimited), Err(SpeechError::RateLimited)],
        always_audio,
    );
    let tts = CloudTts::new(endpoint.clone(), 5, Duration::from_secs(1));

    let start = tokio::time::Instant::now();
    let artifact = tts.synthesize(&request(OutputKind::Mp3)).await.unwrap();

    assert_eq!(endpoint.calls(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(2 + 4));

    let delivery = artifact.deliver().unwrap();
    assert_eq!(delivery.bytes, b"ID3fakeaudio");
    assert_eq!(delivery.mime, "audio/mp3");
}

#[tokio::test]
async fn long_text_is_synthesized_in_chunks_and_concatenated() {
    let endpoint = ScriptedEndpoint::new(vec![Ok(b"AA".to_vec()), Ok(b"BB".to_vec())], || {
        panic!("more chunks than expected")
    });
    let tts = CloudTts::new(endpoint.clone(), 5, Duration::from_secs(1));

    let long_text = "word ".repeat(60); // ~300 chars → two chunks
    assert_eq!(chunk_text(&long_text, MAX_CHUNK_CHARS).len(), 2);

    let req = SpeechRequest {
        text: &long_text,
        ..request(OutputKind::Mp3)
    };
    let artifact = tts.synthesize(&req).await.unwrap();
    assert_eq!(endpoint.calls(), 2);
    assert_eq!(artifact.deliver().unwrap().bytes, b"AABB");
}

#[tokio::test]
async fn artifact_file_is_gone_after_delivery_and_after_abandonment() {
    let endpoint = ScriptedEndpoint::new(vec![], always_audio);
    let tts = CloudTts::new(endpoint, 5, Duration::from_secs(1));

    // Delivered path: file deleted once read.
    let artifact = tts.synthesize(&request(OutputKind::Wav)).await.unwrap();
    let path = artifact.path().to_path_buf();
    assert!(path.exists());
    artifact.deliver().unwrap();
    assert!(!path.exists(), "delivered artifact must be deleted");

    // Orphaned path: a conversion whose delivery never happens still
    // cleans up when the artifact is dropped.
    let endpoint = ScriptedEndpoint::new(vec![], always_audio);
    let tts = CloudTts::new(endpoint, 5, Duration::from_secs(1));
    let artifact = tts.synthesize(&request(OutputKind::Wav)).await.unwrap();
    let path = artifact.path().to_path_buf();
    drop(artifact);
    assert!(!path.exists(), "abandoned artifact must be deleted");
}

// ── Local-to-cloud fallback ──────────────────────────────────────────────────

struct NoVoicesLocal;

#[async_trait]
impl SpeechSynthesizer for NoVoicesLocal {
    async fn synthesize(&self, _request: &SpeechRequest<'_>) -> Result<Artifact, SpeechError> {
        Err(SpeechError::VoiceNotFound)
    }
}

struct RecordingCloud {
    languages: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingCloud {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Artifact, SpeechError> {
        self.languages
            .lock()
            .unwrap()
            .push(request.language.to_string());
        Ok(Artifact::from_bytes(b"cloud-bytes", request.kind)?)
    }
}

#[tokio::test]
async fn missing_voice_falls_back_to_cloud_with_english() {
    let cloud = RecordingCloud {
        languages: Mutex::new(Vec::new()),
    };
    // The request carries Tamil; the fallback must still pin English.
    let (artifact, backend) = synthesize_with_fallback(&NoVoicesLocal, &cloud, &request(OutputKind::Mp3))
        .await
        .unwrap();

    assert_eq!(backend, BackendUsed::CloudFallback);
    assert_eq!(*cloud.languages.lock().unwrap(), vec!["en"]);
    assert_eq!(artifact.deliver().unwrap().bytes, b"cloud-bytes");
}

struct FailingLocal;

#[async_trait]
impl SpeechSynthesizer for FailingLocal {
    async fn synthesize(&self, _request: &SpeechRequest<'_>) -> Result<Artifact, SpeechError> {
        Err(SpeechError::EngineFailed("synthesis crashed".into()))
    }
}

#[tokio::test]
async fn hard_local_failure_does_not_fall_back() {
    let cloud = RecordingCloud {
        languages: Mutex::new(Vec::new()),
    };
    let result = synthesize_with_fallback(&FailingLocal, &cloud, &request(OutputKind::Wav)).await;

    assert!(matches!(result, Err(SpeechError::EngineFailed(_))));
    assert!(cloud.languages.lock().unwrap().is_empty());
}

// ── PDF extraction ───────────────────────────────────────────────────────────

/// Assemble a well-formed single-xref PDF with one `Tj` text run per page.
///
/// Offsets are computed while the body is built, so the xref table is
/// byte-accurate and any strict parser accepts the file.
fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
    let n = pages.len();
    // Object numbering: 1 catalog, 2 pages, then per page i:
    // (3+2i) page object, (4+2i) content stream; last object is the font.
    let font_id = 3 + 2 * n;
    let kids = (0..n)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut body: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets: Vec<usize> = Vec::new();

    let push_obj = |body: &mut Vec<u8>, offsets: &mut Vec<usize>, content: String| {
        offsets.push(body.len());
        body.extend_from_slice(content.as_bytes());
    };

    push_obj(
        &mut body,
        &mut offsets,
        "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n".to_string(),
    );
    push_obj(
        &mut body,
        &mut offsets,
        format!("2 0 obj\n<< /Type /Pages /Kids [{kids}] /Count {n} >>\nendobj\n"),
    );
    for (i, text) in pages.iter().enumerate() {
        let page_id = 3 + 2 * i;
        let content_id = 4 + 2 * i;
        push_obj(
            &mut body,
            &mut offsets,
            format!(
                "{page_id} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {content_id} 0 R >>\nendobj\n"
            ),
        );
        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET\n")
        };
        push_obj(
            &mut body,
            &mut offsets,
            format!(
                "{content_id} 0 obj\n<< /Length {} >>\nstream\n{stream}endstream\nendobj\n",
                stream.len()
            ),
        );
    }
    push_obj(
        &mut body,
        &mut offsets,
        format!("{font_id} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n"),
    );

    let xref_offset = body.len();
    let total = offsets.len() + 1;
    body.extend_from_slice(format!("xref\n0 {total}\n").as_bytes());
    body.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        body.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    body.extend_from_slice(
        format!("trailer\n<< /Size {total} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n")
            .as_bytes(),
    );
    body
}

#[test]
fn extraction_concatenates_pages_in_order() {
    let pdf = minimal_pdf(&["First page text", "Second page text"]);
    let config = ConversionConfig::default();
    let text = pdf2media::extract_text(&pdf, &config);

    let first = text.find("First page text").expect("first page extracted");
    let second = text.find("Second page text").expect("second page extracted");
    assert!(first < second, "pages must stay in page order");
}

#[test]
fn extraction_skips_empty_pages_without_placeholder() {
    let pdf = minimal_pdf(&["Before", "", "After"]);
    let config = ConversionConfig::default();
    let text = pdf2media::extract_text(&pdf, &config);

    assert!(text.contains("Before"));
    assert!(text.contains("After"));
}

#[test]
fn extraction_of_textless_document_is_empty() {
    let pdf = minimal_pdf(&[""]);
    let config = ConversionConfig::default();
    assert_eq!(pdf2media::extract_text(&pdf, &config), "");
}

#[test]
fn extraction_of_garbage_is_empty_not_a_panic() {
    let config = ConversionConfig::default();
    assert_eq!(pdf2media::extract_text(b"definitely not a pdf", &config), "");
}

// ── Rendering & round trip ───────────────────────────────────────────────────

#[tokio::test]
async fn txt_round_trip_preserves_extracted_text() {
    let pdf = minimal_pdf(&["Round trip payload"]);
    let config = ConversionConfig::builder()
        .output(OutputKind::Txt)
        .build()
        .unwrap();

    let extracted = pdf2media::extract_text(&pdf, &config);
    assert!(!extracted.is_empty());

    let output = convert(&extracted, &config).await.unwrap();
    assert_eq!(output.delivery.bytes, extracted.as_bytes());
    assert_eq!(output.delivery.file_name, "converted.txt");
    assert_eq!(output.stats.backend, None);
}

#[tokio::test]
async fn doc_output_is_verbatim_and_download_named() {
    let config = ConversionConfig::builder()
        .output(OutputKind::Doc)
        .build()
        .unwrap();
    let output = convert("doc body text", &config).await.unwrap();
    assert_eq!(output.delivery.bytes, b"doc body text");
    assert_eq!(output.delivery.mime, "application/msword");
    assert_eq!(output.delivery.file_name, "converted.doc");
}

#[tokio::test]
async fn docx_output_is_sanitized_zip_package() {
    let config = ConversionConfig::builder()
        .output(OutputKind::Docx)
        .build()
        .unwrap();
    let output = convert("body\x07with bell", &config).await.unwrap();
    assert_eq!(&output.delivery.bytes[..2], b"PK");
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let config = ConversionConfig::default();
    let result = convert("   \n ", &config).await;
    assert!(matches!(result, Err(Pdf2MediaError::EmptyText)));
}

// ── Sanitizer contract ───────────────────────────────────────────────────────

#[test]
fn sanitize_is_idempotent_and_keeps_whitespace() {
    let nasty = "text\x00 with\u{200B} junk\n\tand layout \x1B[31m";
    let once = sanitize(nasty);
    assert_eq!(sanitize(&once), once);
    assert!(once.contains('\n'));
    assert!(once.contains('\t'));
    assert!(once.contains(' '));
    assert!(!once.contains('\x00'));
    assert!(!once.contains('\u{200B}'));
}

// ── Session cache ────────────────────────────────────────────────────────────

#[test]
fn session_cache_skips_re_extraction_for_same_upload() {
    let config = ConversionConfig::default();
    let mut cache = SessionCache::new();
    let pdf = minimal_pdf(&["Cached once"]);

    let (first, from_cache) =
        pdf2media::session::extract_cached(&mut cache, "upload-1", &pdf, &config);
    assert!(!from_cache);
    assert!(first.contains("Cached once"));

    // Same key, garbage bytes: the cache must answer, not re-extract.
    let (second, from_cache) =
        pdf2media::session::extract_cached(&mut cache, "upload-1", b"garbage", &config);
    assert!(from_cache);
    assert_eq!(second, first);

    // New key invalidates the old entry.
    let (third, from_cache) =
        pdf2media::session::extract_cached(&mut cache, "upload-2", b"garbage", &config);
    assert!(!from_cache);
    assert_eq!(third, "");
    assert_eq!(cache.get("upload-1"), None);
}

// ── Language table ───────────────────────────────────────────────────────────

#[test]
fn language_labels_resolve_and_share_codes() {
    assert_eq!(pdf2media::language::resolve("English (India)"), Some("en"));
    assert_eq!(pdf2media::language::resolve("Hindi"), Some("hi"));
    assert_eq!(pdf2media::language::resolve("Esperanto"), None);
    for label in pdf2media::language::labels() {
        assert!(pdf2media::language::resolve(label).is_some());
    }
}

#[test]
fn unknown_language_selection_is_a_typed_error() {
    let err = pdf2media::language::resolve_selection("Not A Real Language");
    assert!(matches!(
        err,
        Err(Pdf2MediaError::UnknownLanguage { ref label }) if label == "Not A Real Language"
    ));
    // Bare codes pass through; labels resolve.
    assert_eq!(
        pdf2media::language::resolve_selection("ta").unwrap(),
        "ta"
    );
    assert_eq!(
        pdf2media::language::resolve_selection("Tamil").unwrap(),
        "ta"
    );
}
