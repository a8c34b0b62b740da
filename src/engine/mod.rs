//! External engine collaborators
//!
//! The state machine treats media fetching, transcription, text generation,
//! TTS rendering and packaging as opaque awaited operations behind the
//! `Engine` trait; the core only records the resulting artifact paths.

pub mod process;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::Result;
use crate::prompts::PromptKind;

pub use process::ProcessEngine;

/// Boundary to the external provider layer.
///
/// Every operation takes typed inputs, writes its artifact to `dest` and
/// returns; retries and backoff belong to the providers, not to the core.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Download the audio track for a video URL into `dest_dir`.
    /// Returns the path of the downloaded file.
    async fn fetch_media(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;

    /// Transcribe an audio file into `dest`.
    async fn transcribe(&self, audio: &Path, lang: &str, dest: &Path) -> Result<()>;

    /// Run a text-generation prompt and write the output into `dest`.
    async fn generate(&self, kind: PromptKind, prompt: &str, dest: &Path) -> Result<()>;

    /// Render a script to audio into `dest`.
    async fn render_tts(&self, script: &Path, lang: &str, dest: &Path) -> Result<()>;

    /// Build the export archive at `dest` from the given files.
    async fn package(&self, files: &[PathBuf], dest: &Path) -> Result<()>;
}
