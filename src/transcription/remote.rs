use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::RecognitionConfig;

/// Seam for the remote speech-recognition collaborator.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Submit one audio chunk and return the recognized text.
    async fn recognize(&self, audio_path: &Path) -> Result<String>;
}

/// reqwest client for an OpenAI-compatible transcription endpoint
/// (e.g. `http://localhost:8000/v1/audio/transcriptions`).
pub struct RemoteRecognizer {
    config: RecognitionConfig,
    client: reqwest::Client,
}

impl RemoteRecognizer {
    pub fn new(config: RecognitionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SpeechRecognizer for RemoteRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());

        debug!("Submitting chunk {} to recognition service", audio_path.display());

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("recognition service error {}: {}", status, body));
        }

        let json: serde_json::Value = response.json().await?;
        let text = json
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(text)
    }
}
