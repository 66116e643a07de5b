pub mod chunker;
pub mod engine;
pub mod remote;

pub use chunker::{plan_windows, ChunkWindow};
pub use engine::{ChunkOutcome, ChunkedTranscriber, TranscriptionResult};
pub use remote::{RemoteRecognizer, SpeechRecognizer};
