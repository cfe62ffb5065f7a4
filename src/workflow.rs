use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audio::AudioExtractor;
use crate::error::{Result, VidscribeError};
use crate::store::VideoStore;
use crate::transcription::TranscriptionService;

/// Stages of a single in-flight upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadState {
    /// Ready to accept a new upload
    Waiting,

    /// Local audio extraction in progress
    Converting,

    /// Audio bytes being handed to the video store
    Uploading,

    /// Transcription in progress
    Generating,

    /// Pipeline finished; terminal until a new upload resets to Waiting
    Success,
}

impl UploadState {
    /// Whether `next` is a legal successor of this state. Transitions are
    /// strictly sequential; any in-flight stage may reset to Waiting on
    /// error.
    pub fn can_transition_to(self, next: UploadState) -> bool {
        use UploadState::*;
        matches!(
            (self, next),
            (Waiting, Converting)
                | (Converting, Uploading)
                | (Uploading, Generating)
                | (Generating, Success)
                | (Success, Waiting)
                | (Converting, Waiting)
                | (Uploading, Waiting)
                | (Generating, Waiting)
        )
    }

    /// Whether an upload is currently between submission and completion
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            UploadState::Converting | UploadState::Uploading | UploadState::Generating
        )
    }
}

/// Result of a completed upload workflow
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub video_id: Uuid,
    pub transcription: String,
}

/// Sequences extraction, upload and transcription for one video at a time.
///
/// The orchestrator owns an explicit state machine: invalid transitions are
/// rejected, a new upload may not start while one is in flight, and any
/// stage error resets the machine to Waiting so the caller can retry.
pub struct UploadWorkflow {
    extractor: AudioExtractor,
    store: VideoStore,
    transcription: TranscriptionService,
    state: UploadState,
}

impl UploadWorkflow {
    pub fn new(
        extractor: AudioExtractor,
        store: VideoStore,
        transcription: TranscriptionService,
    ) -> Self {
        Self {
            extractor,
            store,
            transcription,
            state: UploadState::Waiting,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    fn advance(&mut self, next: UploadState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(VidscribeError::Validation(format!(
                "invalid state transition {:?} -> {:?}",
                self.state, next
            )));
        }
        info!("Upload state: {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Run the full pipeline for one video file. Non-reentrant: refused
    /// while a previous upload is in flight.
    pub async fn run(&mut self, video_path: &Path, prompt_hint: &str) -> Result<UploadOutcome> {
        if self.state.is_in_flight() {
            return Err(VidscribeError::Validation(
                "an upload is already in progress".to_string(),
            ));
        }

        // Success is terminal until the user starts the next upload
        if self.state == UploadState::Success {
            self.advance(UploadState::Waiting)?;
        }

        match self.run_stages(video_path, prompt_hint).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("Upload failed in state {:?}: {}", self.state, e);
                self.state = UploadState::Waiting;
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self, video_path: &Path, prompt_hint: &str) -> Result<UploadOutcome> {
        self.advance(UploadState::Converting)?;
        let work_dir = tempfile::tempdir()?;
        let audio_path = self.extractor.extract(video_path, work_dir.path()).await?;

        self.advance(UploadState::Uploading)?;
        let audio_bytes = tokio::fs::read(&audio_path).await?;
        let filename = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());
        let record = self.store.accept(&audio_bytes, &filename).await?;

        self.advance(UploadState::Generating)?;
        let transcription = self.transcription.transcribe(record.id, prompt_hint).await?;

        self.advance(UploadState::Success)?;

        Ok(UploadOutcome {
            video_id: record.id,
            transcription,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::UploadState::*;

    #[test]
    fn test_sequential_transitions_are_legal() {
        assert!(Waiting.can_transition_to(Converting));
        assert!(Converting.can_transition_to(Uploading));
        assert!(Uploading.can_transition_to(Generating));
        assert!(Generating.can_transition_to(Success));
        assert!(Success.can_transition_to(Waiting));
    }

    #[test]
    fn test_skipping_stages_is_rejected() {
        assert!(!Waiting.can_transition_to(Uploading));
        assert!(!Waiting.can_transition_to(Generating));
        assert!(!Waiting.can_transition_to(Success));
        assert!(!Converting.can_transition_to(Generating));
        assert!(!Converting.can_transition_to(Success));
        assert!(!Uploading.can_transition_to(Success));
    }

    #[test]
    fn test_errors_reset_to_waiting() {
        assert!(Converting.can_transition_to(Waiting));
        assert!(Uploading.can_transition_to(Waiting));
        assert!(Generating.can_transition_to(Waiting));
    }

    #[test]
    fn test_no_backwards_or_reflexive_transitions() {
        assert!(!Success.can_transition_to(Generating));
        assert!(!Generating.can_transition_to(Uploading));
        assert!(!Waiting.can_transition_to(Waiting));
        assert!(!Success.can_transition_to(Success));
    }

    #[test]
    fn test_in_flight_states() {
        assert!(!Waiting.is_in_flight());
        assert!(Converting.is_in_flight());
        assert!(Uploading.is_in_flight());
        assert!(Generating.is_in_flight());
        assert!(!Success.is_in_flight());
    }
}
