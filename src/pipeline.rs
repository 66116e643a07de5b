use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::config::Config;
use crate::history::{HistoryRecord, HistoryStore};
use crate::languages;
use crate::media::MediaLoader;
use crate::transcription::{ChunkedTranscriber, RemoteRecognizer, SpeechRecognizer};
use crate::translation::{self, RemoteTranslator, TranslationService};

/// Result of processing one upload end to end.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub filename: String,
    pub language: String,
    pub chunk_count: usize,
    pub failed_chunks: usize,
    pub transcript: String,
    pub transcript_path: PathBuf,
    pub translation: Option<String>,
    pub translation_path: Option<PathBuf>,
    /// Target was the source language, so translation was not attempted
    pub translation_skipped: bool,
    /// Translation stage error, surfaced without discarding the transcript
    pub translation_error: Option<String>,
    pub record_appended: bool,
    pub processing_time: Duration,
}

/// Runs one upload through media loading, chunked transcription,
/// translation, and history append.
///
/// Stage policy: media failures abort the request with no partial
/// output; chunk failures are absorbed by the transcriber; a translation
/// failure aborts only that stage, leaving the transcript visible.
pub struct RequestPipeline {
    config: Config,
    loader: MediaLoader,
    transcriber: ChunkedTranscriber,
    translator: Arc<dyn TranslationService>,
}

impl RequestPipeline {
    /// Build a pipeline with the remote service clients.
    pub fn new(config: Config) -> Result<Self> {
        let recognizer: Arc<dyn SpeechRecognizer> =
            Arc::new(RemoteRecognizer::new(config.recognition.clone())?);
        let translator: Arc<dyn TranslationService> =
            Arc::new(RemoteTranslator::new(config.translation.clone())?);

        Ok(Self::with_services(config, recognizer, translator))
    }

    /// Build a pipeline with explicit service implementations.
    pub fn with_services(
        config: Config,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn TranslationService>,
    ) -> Self {
        let loader = MediaLoader::new(config.media.target_sample_rate);
        let transcriber = ChunkedTranscriber::new(config.transcription.chunk_seconds, recognizer);

        Self {
            config,
            loader,
            transcriber,
            translator,
        }
    }

    /// Process one uploaded file into the given target language.
    pub async fn process(
        &self,
        upload: &std::path::Path,
        language_name: &str,
        history: &mut HistoryStore,
    ) -> Result<ProcessOutcome> {
        let start_time = Instant::now();

        let target_code = languages::code_for(language_name)
            .ok_or_else(|| anyhow!("unknown target language: {}", language_name))?;

        let filename = upload
            .file_name()
            .ok_or_else(|| anyhow!("invalid upload path"))?
            .to_string_lossy()
            .to_string();

        // Temporary media assets live here and are removed when the
        // request ends.
        let work_dir = tempfile::tempdir()?;

        let audio = self.loader.prepare_audio(upload, work_dir.path()).await?;
        let transcription = self.transcriber.transcribe(&audio, work_dir.path()).await?;

        let transcript_path = self.write_text_file(&filename, "transcription", None, &transcription.text).await?;
        info!("Transcript saved to {}", transcript_path.display());

        let translation_outcome = self
            .translate_and_record(&transcription.text, &filename, language_name, target_code, history)
            .await?;

        Ok(ProcessOutcome {
            filename,
            language: language_name.to_string(),
            chunk_count: transcription.chunk_count,
            failed_chunks: transcription.failed_chunks,
            transcript: transcription.text,
            transcript_path,
            translation: translation_outcome.text,
            translation_path: translation_outcome.path,
            translation_skipped: translation_outcome.skipped,
            translation_error: translation_outcome.error,
            record_appended: translation_outcome.record_appended,
            processing_time: start_time.elapsed(),
        })
    }

    /// Translation stage plus the history append that follows it.
    ///
    /// Skips entirely when the target is the source language; a skipped
    /// or failed translation appends no record.
    async fn translate_and_record(
        &self,
        transcript: &str,
        filename: &str,
        language_name: &str,
        target_code: &str,
        history: &mut HistoryStore,
    ) -> Result<TranslationOutcome> {
        if translation::is_source_language(target_code) {
            info!("Target language is {}; skipping translation", language_name);
            return Ok(TranslationOutcome::skipped());
        }

        info!("Translating to {}...", language_name);
        match self.translator.translate(transcript, target_code).await {
            Ok(translated) => {
                let path = self
                    .write_text_file(filename, "translation", Some(target_code), &translated)
                    .await?;
                info!("Translation saved to {}", path.display());

                history
                    .append(HistoryRecord {
                        filename: filename.to_string(),
                        language: language_name.to_string(),
                        transcription: transcript.to_string(),
                        translation: translated.clone(),
                    })
                    .await?;

                Ok(TranslationOutcome {
                    text: Some(translated),
                    path: Some(path),
                    skipped: false,
                    error: None,
                    record_appended: true,
                })
            }
            Err(e) => {
                error!("Translation failed: {}", e);
                Ok(TranslationOutcome {
                    text: None,
                    path: None,
                    skipped: false,
                    error: Some(e.to_string()),
                    record_appended: false,
                })
            }
        }
    }

    /// Write a transcript or translation to the output directory
    /// (the download surface).
    async fn write_text_file(
        &self,
        filename: &str,
        label: &str,
        code: Option<&str>,
        content: &str,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.config.output.dir).await?;

        let stem = std::path::Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());

        let name = match code {
            Some(code) => format!("{}_{}_{}.txt", stem, label, code),
            None => format!("{}_{}.txt", stem, label),
        };

        let path = self.config.output.dir.join(name);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
struct TranslationOutcome {
    text: Option<String>,
    path: Option<PathBuf>,
    skipped: bool,
    error: Option<String>,
    record_appended: bool,
}

impl TranslationOutcome {
    fn skipped() -> Self {
        Self {
            text: None,
            path: None,
            skipped: true,
            error: None,
            record_appended: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;

    struct FixedRecognizer;

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        async fn recognize(&self, _audio_path: &Path) -> Result<String> {
            Ok("hello".to_string())
        }
    }

    struct EchoTranslator;

    #[async_trait]
    impl TranslationService for EchoTranslator {
        async fn translate(&self, text: &str, target_code: &str) -> Result<String> {
            Ok(format!("[{}] {}", target_code, text))
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl TranslationService for FailingTranslator {
        async fn translate(&self, _text: &str, _target_code: &str) -> Result<String> {
            Err(anyhow!("service unavailable"))
        }
    }

    fn pipeline_with(translator: Arc<dyn TranslationService>, dir: &TempDir) -> RequestPipeline {
        let config = ConfigBuilder::new()
            .with_output_dir(dir.path().join("output"))
            .with_history_file(dir.path().join("history.json"))
            .build();
        RequestPipeline::with_services(config, Arc::new(FixedRecognizer), translator)
    }

    #[tokio::test]
    async fn test_translation_appends_record() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(Arc::new(EchoTranslator), &dir);
        let mut history = HistoryStore::load(dir.path().join("history.json")).await;

        let outcome = pipeline
            .translate_and_record("hello world", "clip.wav", "French", "fr", &mut history)
            .await
            .unwrap();

        assert!(outcome.record_appended);
        assert_eq!(outcome.text.as_deref(), Some("[fr] hello world"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(0).unwrap().language, "French");
        assert!(outcome.path.unwrap().exists());
    }

    #[tokio::test]
    async fn test_skipped_translation_appends_no_record() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(Arc::new(EchoTranslator), &dir);
        let mut history = HistoryStore::load(dir.path().join("history.json")).await;

        let outcome = pipeline
            .translate_and_record("hello world", "clip.wav", "English", "en", &mut history)
            .await
            .unwrap();

        assert!(outcome.skipped);
        assert!(outcome.text.is_none());
        assert!(!outcome.record_appended);
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_transcript_stage() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(Arc::new(FailingTranslator), &dir);
        let mut history = HistoryStore::load(dir.path().join("history.json")).await;

        let outcome = pipeline
            .translate_and_record("hello world", "clip.wav", "French", "fr", &mut history)
            .await
            .unwrap();

        assert!(!outcome.skipped);
        assert!(outcome.text.is_none());
        assert!(outcome.error.unwrap().contains("service unavailable"));
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_language_aborts() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(Arc::new(EchoTranslator), &dir);
        let mut history = HistoryStore::load(dir.path().join("history.json")).await;

        let result = pipeline
            .process(Path::new("clip.wav"), "Klingon", &mut history)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_output_file_naming() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(Arc::new(EchoTranslator), &dir);

        let path = pipeline
            .write_text_file("meeting.mp4", "translation", Some("fr"), "texte")
            .await
            .unwrap();

        assert!(path.ends_with("meeting_translation_fr.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "texte");
    }
}
