use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TranslationConfig;

/// Assumed source language of transcripts; translation to it is skipped.
pub const SOURCE_LANGUAGE_CODE: &str = "en";

/// Whether the translation stage should be skipped entirely for a target
/// code. Skipping is an informational state, not an error, and produces
/// no history record.
pub fn is_source_language(target_code: &str) -> bool {
    target_code.eq_ignore_ascii_case(SOURCE_LANGUAGE_CODE)
}

/// Seam for the remote translation collaborator.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate text into the target language code, with automatic
    /// source-language detection.
    async fn translate(&self, text: &str, target_code: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// reqwest client for a LibreTranslate-style endpoint.
pub struct RemoteTranslator {
    config: TranslationConfig,
    client: reqwest::Client,
}

impl RemoteTranslator {
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TranslationService for RemoteTranslator {
    async fn translate(&self, text: &str, target_code: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_code,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        debug!("Requesting translation to {}", target_code);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("translation service error {}: {}", status, body));
        }

        let translated: TranslateResponse = response.json().await?;
        Ok(translated.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_target_is_skipped() {
        assert!(is_source_language("en"));
        assert!(is_source_language("EN"));
    }

    #[test]
    fn test_other_targets_are_translated() {
        assert!(!is_source_language("fr"));
        assert!(!is_source_language("zh-cn"));
        assert!(!is_source_language(""));
    }

    #[test]
    fn test_request_serialization() {
        let request = TranslateRequest {
            q: "hello",
            source: "auto",
            target: "fr",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "hello");
        assert_eq!(json["source"], "auto");
        assert_eq!(json["target"], "fr");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"translatedText": "bonjour le monde"}"#;
        let response: TranslateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.translated_text, "bonjour le monde");
    }
}
