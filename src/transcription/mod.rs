pub mod whisper;

pub use whisper::WhisperClient;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, VidscribeError};
use crate::store::VideoStore;

/// External speech-to-text capability
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio payload, optionally biased by a keyword hint
    async fn transcribe(&self, audio: Vec<u8>, filename: &str, prompt_hint: &str)
        -> Result<String>;
}

/// Transcribes stored audio and persists the transcript on the video record
#[derive(Clone)]
pub struct TranscriptionService {
    store: VideoStore,
    engine: Arc<dyn SpeechToText>,
}

impl TranscriptionService {
    pub fn new(store: VideoStore, engine: Arc<dyn SpeechToText>) -> Self {
        Self { store, engine }
    }

    /// Transcribe the audio associated with `video_id`.
    ///
    /// An unknown id fails with NotFound before the external capability is
    /// contacted. Re-calling for an already-transcribed video returns the
    /// stored transcript without a second billed call.
    pub async fn transcribe(&self, video_id: Uuid, prompt_hint: &str) -> Result<String> {
        let record = self
            .store
            .get(video_id)
            .await
            .ok_or_else(|| VidscribeError::NotFound(format!("video {}", video_id)))?;

        if let Some(existing) = record.transcription.as_ref().filter(|t| !t.trim().is_empty()) {
            debug!(video_id = %video_id, "Returning cached transcription");
            return Ok(existing.clone());
        }

        let audio = self.store.read_audio(&record).await?;

        info!(
            video_id = %video_id,
            bytes = audio.len(),
            "Sending audio to speech-to-text capability"
        );

        let text = self
            .engine
            .transcribe(audio, &record.original_filename, prompt_hint)
            .await?;

        self.store.set_transcription(video_id, text.clone()).await?;

        info!(video_id = %video_id, chars = text.len(), "Transcription stored");

        Ok(text)
    }
}
