use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// File extensions accepted as audio uploads.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "m4a"];

/// File extensions accepted as video uploads.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

/// Upload kind, decided strictly by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Audio,
    Video,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported file type: {0:?} (expected one of wav/flac/mp3/m4a/mp4/avi/mov)")]
    UnsupportedExtension(String),

    #[error("audio extraction failed for {0} (is ffmpeg installed?)")]
    ExtractionFailed(PathBuf),

    #[error("could not probe media file {0} (is ffprobe installed?)")]
    ProbeFailed(PathBuf),
}

impl MediaKind {
    /// Classify an upload by its extension. Unsupported extensions are the
    /// upload surface's implicit type filter.
    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Ok(MediaKind::Audio)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Ok(MediaKind::Video)
        } else {
            Err(MediaError::UnsupportedExtension(ext))
        }
    }
}

/// Playable audio asset produced from an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    pub path: PathBuf,
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u32,
    pub file_size: u64,
}

/// Turns an uploaded file into a playable PCM audio asset.
///
/// Audio uploads are used as-is; video uploads have their audio track
/// extracted with ffmpeg into the request's working directory.
#[derive(Clone)]
pub struct MediaLoader {
    /// Sample rate for extracted audio tracks
    pub target_sample_rate: u32,
}

impl MediaLoader {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    /// Produce the playable audio asset for an upload.
    ///
    /// Decode failure aborts the request with no partial result.
    pub async fn prepare_audio(&self, upload: &Path, work_dir: &Path) -> Result<AudioInfo> {
        let kind = MediaKind::from_path(upload)?;

        let audio_path = match kind {
            MediaKind::Audio => upload.to_path_buf(),
            MediaKind::Video => {
                let stem = upload
                    .file_stem()
                    .ok_or_else(|| anyhow!("invalid upload filename"))?
                    .to_string_lossy();
                let extracted = work_dir.join(format!("{}.wav", stem));
                self.extract_audio(upload, &extracted).await?;
                extracted
            }
        };

        self.probe(&audio_path).await
    }

    /// Extract a 16-bit linear PCM WAV track from a video file.
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!("Extracting audio track: {}", video_path.display());

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i",
                video_path.to_str().unwrap_or_default(),
                "-vn",
                "-acodec",
                "pcm_s16le",
                "-ar",
                &self.target_sample_rate.to_string(),
                "-ac",
                "1",
                "-f",
                "wav",
                "-y",
                audio_path.to_str().unwrap_or_default(),
            ])
            .status()
            .await
            .map_err(|_| MediaError::ExtractionFailed(video_path.to_path_buf()))?;

        if !status.success() {
            return Err(MediaError::ExtractionFailed(video_path.to_path_buf()).into());
        }

        info!("Audio track extracted to {}", audio_path.display());
        Ok(())
    }

    /// Probe an audio asset with ffprobe for duration and stream details.
    pub async fn probe(&self, audio_path: &Path) -> Result<AudioInfo> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "a:0",
                audio_path.to_str().unwrap_or_default(),
            ])
            .output()
            .await
            .map_err(|_| MediaError::ProbeFailed(audio_path.to_path_buf()))?;

        if !output.status.success() {
            return Err(MediaError::ProbeFailed(audio_path.to_path_buf()).into());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let file_size = tokio::fs::metadata(audio_path).await?.len();

        self.parse_probe_output(&json_str, audio_path, file_size)
    }

    /// Build an AudioInfo from ffprobe's JSON output.
    ///
    /// A missing or unparseable duration is a probe failure: zero windows
    /// would otherwise turn into a silently empty transcript.
    fn parse_probe_output(
        &self,
        json_str: &str,
        audio_path: &Path,
        file_size: u64,
    ) -> Result<AudioInfo> {
        let probe: serde_json::Value = serde_json::from_str(json_str)?;

        let streams = probe["streams"]
            .as_array()
            .ok_or_else(|| anyhow!("no streams in ffprobe output"))?;
        let audio_stream = streams
            .first()
            .ok_or_else(|| anyhow!("no audio stream found in {}", audio_path.display()))?;

        let duration_seconds: f64 = probe["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("no duration reported for {}", audio_path.display()))?;

        Ok(AudioInfo {
            path: audio_path.to_path_buf(),
            duration: Duration::from_secs_f64(duration_seconds),
            sample_rate: audio_stream["sample_rate"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(self.target_sample_rate),
            channels: audio_stream["channels"].as_u64().unwrap_or(1) as u32,
            file_size,
        })
    }
}

impl Default for MediaLoader {
    fn default() -> Self {
        Self::new(16000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_extensions() {
        for ext in AUDIO_EXTENSIONS {
            let path = PathBuf::from(format!("clip.{}", ext));
            assert_eq!(MediaKind::from_path(&path).unwrap(), MediaKind::Audio);
        }
    }

    #[test]
    fn test_video_extensions() {
        for ext in VIDEO_EXTENSIONS {
            let path = PathBuf::from(format!("clip.{}", ext));
            assert_eq!(MediaKind::from_path(&path).unwrap(), MediaKind::Video);
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(
            MediaKind::from_path(Path::new("REC.WAV")).unwrap(),
            MediaKind::Audio
        );
        assert_eq!(
            MediaKind::from_path(Path::new("holiday.MOV")).unwrap(),
            MediaKind::Video
        );
    }

    #[test]
    fn test_unsupported_extensions_rejected() {
        assert!(MediaKind::from_path(Path::new("notes.txt")).is_err());
        assert!(MediaKind::from_path(Path::new("clip.webm")).is_err());
        assert!(MediaKind::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_loader_defaults() {
        let loader = MediaLoader::default();
        assert_eq!(loader.target_sample_rate, 16000);
    }

    const PROBE_JSON: &str = r#"{
        "streams": [{"sample_rate": "44100", "channels": 2}],
        "format": {"duration": "125.3"}
    }"#;

    #[test]
    fn test_parse_probe_output() {
        let loader = MediaLoader::default();
        let info = loader
            .parse_probe_output(PROBE_JSON, Path::new("clip.wav"), 1024)
            .unwrap();

        assert_eq!(info.duration, Duration::from_secs_f64(125.3));
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.file_size, 1024);
    }

    #[test]
    fn test_probe_without_duration_is_an_error() {
        let loader = MediaLoader::default();
        let json = r#"{
            "streams": [{"sample_rate": "44100", "channels": 2}],
            "format": {}
        }"#;

        let result = loader.parse_probe_output(json, Path::new("clip.wav"), 1024);
        assert!(result.unwrap_err().to_string().contains("duration"));
    }

    #[test]
    fn test_probe_without_audio_stream_is_an_error() {
        let loader = MediaLoader::default();
        let json = r#"{"streams": [], "format": {"duration": "10.0"}}"#;

        assert!(loader
            .parse_probe_output(json, Path::new("clip.wav"), 0)
            .is_err());
    }
}
