//! CLI binary for pdf2media.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, renders the heartbeat on an indicatif bar, and
//! writes the delivered bytes to disk.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2media::pipeline::local::EspeakEngine;
use pdf2media::{
    convert_document, extract_text, language, AudioBackend, ConversionConfig, ConversionStats,
    OutputKind, Progress, ProgressObserver, VoiceGender, VoiceRate,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal rendering of the synthetic heartbeat: a 0–100 bar plus the
/// tick message.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl ProgressObserver for CliProgress {
    fn on_tick(&self, percent: u8, message: &str) {
        self.bar.set_position(percent as u64);
        self.bar.set_message(message.to_string());
    }

    fn on_complete(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", green("✔"), bold(message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text and save it as converted.txt
  pdf2media document.pdf

  # Text-to-speech via the cloud endpoint, in Hindi
  pdf2media --to mp3 --language "Hindi" document.pdf

  # Prefer the local engine, female voice, slow rate
  pdf2media --to wav --backend local --gender female --rate slow document.pdf

  # Word output with a chosen destination
  pdf2media --to docx -o report.docx document.pdf

  # Preview the extracted text only (no conversion)
  pdf2media --extract-only document.pdf

  # What languages / local voices are available?
  pdf2media --list-languages
  pdf2media --list-voices

OUTPUT FORMATS:
  Kind   Mime                                    Produced by
  ─────  ──────────────────────────────────────  ─────────────────────────
  mp3    audio/mp3                               cloud TTS or local engine
  wav    audio/wav                               cloud TTS or local engine
  doc    application/msword                      plain UTF-8 text
  docx   application/vnd.openxmlformats-…        single-paragraph document
  txt    text/plain                              plain UTF-8 text

NOTES:
  The local backend needs espeak-ng (or espeak) on PATH. When no installed
  voice matches the requested gender, synthesis falls back to the cloud
  endpoint with English. The cloud endpoint rate-limits; 429 responses are
  retried up to --max-attempts with exponential backoff.
"#;

/// Convert PDF documents to audio (MP3/WAV) or DOC/DOCX/TXT files.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2media",
    version,
    about = "Convert PDF documents to audio (MP3/WAV) or DOC/DOCX/TXT files",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(required_unless_present_any = ["list_languages", "list_voices"])]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(short = 't', long = "to", env = "PDF2MEDIA_FORMAT", value_enum, default_value = "txt")]
    to: KindArg,

    /// Write the output to this file instead of converted.<ext>.
    #[arg(short, long, env = "PDF2MEDIA_OUTPUT")]
    output: Option<PathBuf>,

    /// Audio backend: cloud, or local (with cloud fallback).
    #[arg(long, env = "PDF2MEDIA_BACKEND", value_enum, default_value = "cloud")]
    backend: BackendArg,

    /// Voice gender for the local engine.
    #[arg(long, value_enum, default_value = "unspecified")]
    gender: GenderArg,

    /// Speaking rate for the local engine.
    #[arg(long, value_enum, default_value = "normal")]
    rate: RateArg,

    /// Language for cloud audio: a display label ("English (India)") or a
    /// bare code ("hi").
    #[arg(short, long, env = "PDF2MEDIA_LANGUAGE", default_value = "English")]
    language: String,

    /// Skip the non-printable-character filter before DOCX output.
    #[arg(long)]
    no_sanitize: bool,

    /// Keep leading/trailing whitespace of the extracted text.
    #[arg(long)]
    no_trim: bool,

    /// Total cloud synthesis attempts under rate-limiting.
    #[arg(long, env = "PDF2MEDIA_MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u32,

    /// Cloud call timeout in seconds.
    #[arg(long, env = "PDF2MEDIA_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// Override the cloud TTS endpoint URL.
    #[arg(long, env = "PDF2MEDIA_ENDPOINT", hide = true)]
    endpoint: Option<String>,

    /// Print the extracted text and exit (no conversion).
    #[arg(long)]
    extract_only: bool,

    /// Print the language labels the cloud backend accepts.
    #[arg(long)]
    list_languages: bool,

    /// Print the local engine's installed voices.
    #[arg(long)]
    list_voices: bool,

    /// Print conversion stats as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2MEDIA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MEDIA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except a generic failure message.
    #[arg(short, long, env = "PDF2MEDIA_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Mp3,
    Wav,
    Doc,
    Docx,
    Txt,
}

impl From<KindArg> for OutputKind {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::Mp3 => OutputKind::Mp3,
            KindArg::Wav => OutputKind::Wav,
            KindArg::Doc => OutputKind::Doc,
            KindArg::Docx => OutputKind::Docx,
            KindArg::Txt => OutputKind::Txt,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Cloud,
    Local,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum GenderArg {
    Unspecified,
    Male,
    Female,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RateArg {
    Slow,
    Normal,
    Fast,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    // Nothing may escape the request flow as a crash: report and exit.
    if let Err(e) = run(cli).await {
        if quiet {
            eprintln!("An error occurred.");
        } else {
            eprintln!("{} {e:#}", red("✘"));
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Listing modes ────────────────────────────────────────────────────
    if cli.list_languages {
        for label in language::labels() {
            // resolve() cannot miss for labels the table itself yields
            let code = language::resolve(label).unwrap_or("?");
            println!("{label:<24} {code}");
        }
        return Ok(());
    }

    if cli.list_voices {
        let engine = EspeakEngine::detect().context("no local speech engine on PATH")?;
        let voices = engine.voices().await.context("could not list voices")?;
        for v in &voices {
            let gender = match v.gender {
                Some(VoiceGender::Male) => "male",
                Some(VoiceGender::Female) => "female",
                _ => "-",
            };
            println!("{:<28} {:<8} {:<8} {}", v.name, v.language, gender, v.identifier);
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("an input PDF path is required")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<Progress> = if show_progress {
        Some(CliProgress::new() as Arc<dyn ProgressObserver>)
    } else {
        None
    };
    let config = build_config(&cli, progress)?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let bytes = tokio::fs::read(&input)
            .await
            .with_context(|| format!("could not read {}", input.display()))?;
        let text = extract_text(&bytes, &config);
        if text.is_empty() {
            anyhow::bail!("no text found in the uploaded PDF");
        }
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).context("stdout")?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n").ok();
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_document(&input, &config)
        .await
        .context("Conversion failed")?;

    let out_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&output.delivery.file_name));
    write_atomic(&out_path, &output.delivery.bytes)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.stats).context("failed to serialise stats")?
        );
    } else if !cli.quiet {
        print_summary(&output.stats, &out_path, output.delivery.mime);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<Progress>) -> Result<ConversionConfig> {
    let language = language::resolve_selection(&cli.language)?;

    let mut builder = ConversionConfig::builder()
        .output(cli.to.into())
        .backend(match cli.backend {
            BackendArg::Cloud => AudioBackend::Cloud,
            BackendArg::Local => AudioBackend::LocalWithFallback,
        })
        .voice_gender(match cli.gender {
            GenderArg::Unspecified => VoiceGender::Unspecified,
            GenderArg::Male => VoiceGender::Male,
            GenderArg::Female => VoiceGender::Female,
        })
        .voice_rate(match cli.rate {
            RateArg::Slow => VoiceRate::Slow,
            RateArg::Normal => VoiceRate::Normal,
            RateArg::Fast => VoiceRate::Fast,
        })
        .language(language)
        .sanitize(!cli.no_sanitize)
        .trim_text(!cli.no_trim)
        .surface_errors(!cli.quiet)
        .max_attempts(cli.max_attempts)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref url) = cli.endpoint {
        builder = builder.endpoint_url(url.clone());
    }
    if let Some(p) = progress {
        builder = builder.progress(p);
    }

    builder.build().context("Invalid configuration")
}

/// Atomic write: temp file in the destination directory, then rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn print_summary(stats: &ConversionStats, out_path: &Path, mime: &str) {
    eprintln!(
        "{}  {}  {}  {}ms",
        green("✔"),
        bold(&out_path.display().to_string()),
        dim(mime),
        stats.total_ms,
    );
    let mut detail = format!(
        "   {} bytes  (extract {}ms, convert {}ms)",
        stats.output_bytes, stats.extract_ms, stats.convert_ms
    );
    if let Some(backend) = stats.backend {
        detail.push_str(&format!("  via {backend}"));
    }
    eprintln!("{}", dim(&detail));
}
