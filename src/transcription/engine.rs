use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::chunker::{cut_window, plan_windows};
use super::remote::SpeechRecognizer;
use crate::media::AudioInfo;

/// Outcome of one recognition request.
///
/// Chunk failures are absorbed into the transcript as placeholders;
/// no single chunk aborts the job.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Recognized(String),
    Unrecognized,
    Failed(String),
}

impl ChunkOutcome {
    /// Map a recognition call result to an outcome. Empty text is the
    /// service's way of saying it could not make out the audio.
    pub fn from_recognition(result: Result<String>) -> Self {
        match result {
            Ok(text) if text.trim().is_empty() => ChunkOutcome::Unrecognized,
            Ok(text) => ChunkOutcome::Recognized(text.trim().to_string()),
            Err(e) => ChunkOutcome::Failed(e.to_string()),
        }
    }

    /// The segment text that joins into the final transcript.
    pub fn render(&self) -> String {
        match self {
            ChunkOutcome::Recognized(text) => text.clone(),
            ChunkOutcome::Unrecognized => "[Unrecognized audio]".to_string(),
            ChunkOutcome::Failed(message) => format!("[Request error: {}]", message),
        }
    }
}

/// Complete transcription result for one asset.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// Full transcript, one space-joined segment per chunk
    pub text: String,
    pub chunk_count: usize,
    /// Chunks that came back as service errors
    pub failed_chunks: usize,
    pub processing_time: Duration,
}

/// Sequential fixed-window transcriber.
///
/// Cuts the asset into windows, submits each to the recognition service
/// in order, and joins the per-chunk outcomes with single spaces.
pub struct ChunkedTranscriber {
    chunk_duration: Duration,
    recognizer: Arc<dyn SpeechRecognizer>,
}

impl ChunkedTranscriber {
    pub fn new(chunk_seconds: u64, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            chunk_duration: Duration::from_secs(chunk_seconds),
            recognizer,
        }
    }

    pub async fn transcribe(&self, audio: &AudioInfo, work_dir: &Path) -> Result<TranscriptionResult> {
        let start_time = std::time::Instant::now();
        let windows = plan_windows(audio.duration, self.chunk_duration);
        let total = windows.len();

        info!(
            "Transcribing {} ({:.1}s, {} chunks)",
            audio.path.display(),
            audio.duration.as_secs_f64(),
            total
        );

        let mut segments = Vec::with_capacity(total);
        let mut failed_chunks = 0;

        for window in &windows {
            let outcome = match cut_window(&audio.path, window, work_dir).await {
                Ok(chunk_path) => {
                    ChunkOutcome::from_recognition(self.recognizer.recognize(&chunk_path).await)
                }
                Err(e) => ChunkOutcome::Failed(e.to_string()),
            };

            match &outcome {
                ChunkOutcome::Recognized(_) => {}
                ChunkOutcome::Unrecognized => {
                    warn!("Chunk {} not recognized", window.index);
                }
                ChunkOutcome::Failed(message) => {
                    warn!("Chunk {} failed: {}", window.index, message);
                    failed_chunks += 1;
                }
            }

            segments.push(outcome.render());
            info!("Transcribed chunk {} of {}", window.index + 1, total);
        }

        Ok(TranscriptionResult {
            text: join_segments(&segments),
            chunk_count: total,
            failed_chunks,
            processing_time: start_time.elapsed(),
        })
    }
}

/// Join per-chunk segments in original order with single spaces.
pub fn join_segments(segments: &[String]) -> String {
    segments.join(" ")
}
