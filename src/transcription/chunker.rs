use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One fixed-duration slice of the audio asset, submitted as a single
/// recognition request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkWindow {
    pub index: usize,
    /// Offset into the asset, seconds
    pub start: f64,
    /// Window length, seconds (the final window covers the remainder)
    pub length: f64,
}

/// Partition a duration into `ceil(total / chunk)` sequential,
/// non-overlapping windows.
///
/// Fixed windows can split words at boundaries; that is an accepted
/// compromise of the chunking scheme.
pub fn plan_windows(total: Duration, chunk: Duration) -> Vec<ChunkWindow> {
    let total_secs = total.as_secs_f64();
    let chunk_secs = chunk.as_secs_f64();

    if total_secs <= 0.0 || chunk_secs <= 0.0 {
        return Vec::new();
    }

    let num_chunks = (total_secs / chunk_secs).ceil() as usize;
    (0..num_chunks)
        .map(|index| {
            let start = index as f64 * chunk_secs;
            ChunkWindow {
                index,
                start,
                length: (total_secs - start).min(chunk_secs),
            }
        })
        .collect()
}

/// Cut one window out of the audio asset with ffmpeg.
pub async fn cut_window(
    audio_path: &Path,
    window: &ChunkWindow,
    work_dir: &Path,
) -> Result<PathBuf> {
    let stem = audio_path
        .file_stem()
        .ok_or_else(|| anyhow!("invalid audio filename"))?
        .to_string_lossy();
    let chunk_path = work_dir.join(format!("{}_chunk_{:03}.wav", stem, window.index));

    let status = tokio::process::Command::new("ffmpeg")
        .args(cut_args(audio_path, window, &chunk_path))
        .status()
        .await?;

    if !status.success() {
        return Err(anyhow!("failed to cut chunk {} from {}", window.index, audio_path.display()));
    }

    Ok(chunk_path)
}

/// ffmpeg argument list for cutting one window.
///
/// Windows are re-encoded to 16-bit PCM rather than stream-copied: audio
/// uploads arrive in their original codec (m4a, flac, mp3), and the WAV
/// muxer cannot carry AAC or FLAC streams.
fn cut_args(audio_path: &Path, window: &ChunkWindow, chunk_path: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        audio_path.to_string_lossy().into_owned(),
        "-ss".to_string(),
        window.start.to_string(),
        "-t".to_string(),
        window.length.to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        "-y".to_string(),
        chunk_path.to_string_lossy().into_owned(),
    ]
}
