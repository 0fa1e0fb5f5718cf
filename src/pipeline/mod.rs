//! Pipeline stages for document-to-media conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different speech backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ sanitize ──▶ speech ──▶ cloud / local
//! (pdf)       (docx only)  (policy)   (backends)
//!                      └──▶ render
//!                           (doc/docx/txt)
//! ```
//!
//! 1. [`extract`]  — pull per-page text out of the PDF; degrades to empty
//!    on any failure rather than erroring
//! 2. [`sanitize`] — printable-character filter applied before DOCX
//!    serialisation
//! 3. [`speech`]   — voice parameters, the synthesizer capability, and the
//!    local-to-cloud fallback policy
//! 4. [`cloud`]    — HTTP text-to-speech with the 429 retry loop; the only
//!    stage with network I/O
//! 5. [`local`]    — espeak-ng subprocess backend with gendered voice
//!    lookup
//! 6. [`render`]   — DOC/DOCX/TXT serialisation to temp artifacts

pub mod cloud;
pub mod extract;
pub mod local;
pub mod render;
pub mod sanitize;
pub mod speech;
