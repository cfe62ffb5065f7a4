use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, VidscribeError};

/// Extracts a compressed audio track from a video file.
///
/// Runs entirely in the requesting process by shelling out to ffmpeg; the
/// settings mirror the browser-side transcoder this replaces (mono MP3 at a
/// bitrate small enough for speech-to-text upload limits).
#[derive(Debug, Clone)]
pub struct AudioExtractor {
    /// Target audio bitrate passed to the encoder
    pub bitrate: String,

    /// Audio codec used for the extracted track
    pub codec: String,
}

impl AudioExtractor {
    pub fn new() -> Self {
        Self {
            bitrate: "20k".to_string(),
            codec: "libmp3lame".to_string(),
        }
    }

    /// Output path for a given input video
    pub fn audio_output_path(&self, video_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        output_dir.join(format!("{}.mp3", stem))
    }

    /// Extract the audio track of `video_path` into `output_dir` as MP3
    pub async fn extract(&self, video_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let video_str = video_path.to_str().ok_or_else(|| {
            VidscribeError::Validation(format!(
                "video path is not valid UTF-8: {}",
                video_path.display()
            ))
        })?;

        let audio_path = self.audio_output_path(video_path, output_dir);
        let audio_str = audio_path
            .to_str()
            .ok_or_else(|| VidscribeError::Extraction("invalid output path".to_string()))?;

        info!("Extracting audio track: {}", video_path.display());

        tokio::fs::create_dir_all(output_dir).await?;

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i", video_str,
                "-map", "0:a", // Audio stream only
                "-b:a", &self.bitrate,
                "-acodec", &self.codec,
                "-y", // Overwrite existing
                audio_str,
            ])
            .status()
            .await
            .map_err(|e| VidscribeError::Extraction(format!("failed to run ffmpeg: {}", e)))?;

        if !status.success() {
            return Err(VidscribeError::Extraction(format!(
                "ffmpeg exited with {} for {}",
                status,
                video_path.display()
            )));
        }

        info!("Audio extracted: {}", audio_path.display());

        Ok(audio_path)
    }
}

impl Default for AudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}
