use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the audio translator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Media loading and extraction settings
    pub media: MediaConfig,

    /// Chunked transcription settings
    pub transcription: TranscriptionConfig,

    /// Speech-recognition service settings
    pub recognition: RecognitionConfig,

    /// Translation service settings
    pub translation: TranslationConfig,

    /// Text-to-speech service settings
    pub synthesis: SynthesisConfig,

    /// History persistence settings
    pub history: HistoryConfig,

    /// Output and download settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Sample rate for audio extracted from video
    pub target_sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Fixed window length for chunked transcription, seconds
    pub chunk_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Full transcription endpoint URL
    pub endpoint: String,

    /// Model name sent with each request
    pub model: String,

    /// Optional bearer token
    pub api_key: Option<String>,

    /// Per-request timeout, seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Translation endpoint URL
    pub endpoint: String,

    /// Optional API key
    pub api_key: Option<String>,

    /// Per-request timeout, seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Text-to-speech endpoint URL
    pub endpoint: String,

    /// Per-request timeout, seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Backing JSON file for the history store
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for transcript/translation text files
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "audio-translator.toml",
            "config/audio-translator.toml",
            "~/.config/audio-translator/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("no configuration file found"))
    }

    /// Build configuration from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("AUDIO_TRANSLATOR_RECOGNITION_ENDPOINT") {
            config.recognition.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("AUDIO_TRANSLATOR_RECOGNITION_API_KEY") {
            config.recognition.api_key = Some(api_key);
        }

        if let Ok(endpoint) = std::env::var("AUDIO_TRANSLATOR_TRANSLATION_ENDPOINT") {
            config.translation.endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("AUDIO_TRANSLATOR_SYNTHESIS_ENDPOINT") {
            config.synthesis.endpoint = endpoint;
        }

        if let Ok(file) = std::env::var("AUDIO_TRANSLATOR_HISTORY_FILE") {
            config.history.file = PathBuf::from(file);
        }

        if let Ok(dir) = std::env::var("AUDIO_TRANSLATOR_OUTPUT_DIR") {
            config.output.dir = PathBuf::from(dir);
        }

        if let Ok(chunk) = std::env::var("AUDIO_TRANSLATOR_CHUNK_SECONDS") {
            config.transcription.chunk_seconds = chunk.parse().unwrap_or(60);
        }

        config
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.transcription.chunk_seconds == 0 {
            return Err(anyhow!("chunk_seconds must be greater than 0"));
        }

        if self.media.target_sample_rate == 0 {
            return Err(anyhow!("target_sample_rate must be greater than 0"));
        }

        if self.recognition.endpoint.is_empty() {
            return Err(anyhow!("recognition endpoint must be configured"));
        }

        if self.translation.endpoint.is_empty() {
            return Err(anyhow!("translation endpoint must be configured"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                target_sample_rate: 16000,
            },
            transcription: TranscriptionConfig { chunk_seconds: 60 },
            recognition: RecognitionConfig {
                endpoint: "http://localhost:8000/v1/audio/transcriptions".to_string(),
                model: "whisper-1".to_string(),
                api_key: None,
                timeout_seconds: 300,
            },
            translation: TranslationConfig {
                endpoint: "http://localhost:5000/translate".to_string(),
                api_key: None,
                timeout_seconds: 60,
            },
            synthesis: SynthesisConfig {
                endpoint: "http://localhost:5002/api/tts".to_string(),
                timeout_seconds: 60,
            },
            history: HistoryConfig {
                file: PathBuf::from("history.json"),
            },
            output: OutputConfig {
                dir: PathBuf::from("./output"),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_chunk_seconds(mut self, chunk_seconds: u64) -> Self {
        self.config.transcription.chunk_seconds = chunk_seconds;
        self
    }

    pub fn with_recognition_endpoint(mut self, endpoint: String) -> Self {
        self.config.recognition.endpoint = endpoint;
        self
    }

    pub fn with_translation_endpoint(mut self, endpoint: String) -> Self {
        self.config.translation.endpoint = endpoint;
        self
    }

    pub fn with_history_file(mut self, file: PathBuf) -> Self {
        self.config.history.file = file;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
