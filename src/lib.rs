/// Audio/Video Translator
///
/// Transcribes uploaded audio/video files through a remote
/// speech-recognition service, translates the transcript through a remote
/// translation service, optionally synthesizes speech from text, and keeps
/// a JSON-backed history of past results.

pub mod config;
pub mod history;
pub mod languages;
pub mod media;
pub mod pipeline;
pub mod synthesis;
pub mod transcription;
pub mod translation;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::history::{HistoryRecord, HistoryStore};
pub use crate::media::{AudioInfo, MediaKind, MediaLoader};
pub use crate::pipeline::{ProcessOutcome, RequestPipeline};
pub use crate::synthesis::SpeechSynthesizer;
pub use crate::transcription::{ChunkedTranscriber, RemoteRecognizer, SpeechRecognizer, TranscriptionResult};
pub use crate::translation::{RemoteTranslator, TranslationService};
