use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SynthesisConfig;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

/// reqwest client for a remote text-to-speech endpoint: text plus a
/// language code in, a playable audio clip out.
pub struct SpeechSynthesizer {
    config: SynthesisConfig,
    client: reqwest::Client,
}

impl SpeechSynthesizer {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    /// Synthesize speech for `text` and write the clip to `output_path`.
    pub async fn synthesize(&self, text: &str, lang_code: &str, output_path: &Path) -> Result<()> {
        let request = SynthesisRequest { text, lang: lang_code };

        debug!("Requesting speech synthesis ({} chars, lang {})", text.len(), lang_code);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("speech synthesis service error {}: {}", status, body));
        }

        let clip = response.bytes().await?;
        tokio::fs::write(output_path, &clip).await?;

        info!("Synthesized clip written to {} ({} bytes)", output_path.display(), clip.len());
        Ok(())
    }

    /// Play a clip with ffplay, blocking until playback ends.
    pub async fn play(&self, clip_path: &Path) -> Result<()> {
        let status = tokio::process::Command::new("ffplay")
            .args([
                "-nodisp",
                "-autoexit",
                "-loglevel",
                "quiet",
                clip_path.to_str().unwrap_or_default(),
            ])
            .status()
            .await
            .map_err(|_| anyhow!("could not launch ffplay (is it installed?)"))?;

        if !status.success() {
            return Err(anyhow!("playback failed for {}", clip_path.display()));
        }

        Ok(())
    }
}
