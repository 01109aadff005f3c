//! Speech-service boundary — pure I/O seams, no dialogue logic.
//!
//! Speech-to-text and text-to-speech are external collaborators; the traits
//! here are the whole contract. The only concrete piece is the audio format
//! shim: browser recorders hand us WebM, the transcription services want
//! mono 16-bit WAV, and `ffmpeg` bridges the two.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::SpeechError;

/// Transcribes recorded audio into text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Transcribe a WAV file into an utterance.
    async fn transcribe(&self, wav_path: &Path) -> Result<String, SpeechError>;
}

/// Renders a reply as audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Synthesize `text` into an audio file at `out_path`.
    async fn synthesize(&self, text: &str, out_path: &Path) -> Result<(), SpeechError>;
}

/// Convert a WebM recording to mono 16-bit 44.1kHz WAV via `ffmpeg`.
pub async fn convert_webm_to_wav(webm_path: &Path, wav_path: &Path) -> Result<(), SpeechError> {
    debug!(input = %webm_path.display(), output = %wav_path.display(), "Converting audio");

    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(webm_path)
        .args(["-acodec", "pcm_s16le", "-ar", "44100", "-ac", "1"])
        .arg(wav_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(status = ?output.status.code(), "ffmpeg conversion failed");
        return Err(SpeechError::Conversion(format!(
            "ffmpeg exited with {:?}: {}",
            output.status.code(),
            stderr.chars().take(500).collect::<String>()
        )));
    }

    Ok(())
}
