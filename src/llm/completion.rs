use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ChatMessage, TextGenerator, TextStream};
use crate::error::{Result, VidscribeError};
use crate::prompts::TRANSCRIPTION_PLACEHOLDER;
use crate::store::VideoStore;

/// Generates text from a stored transcript and a user-supplied prompt
/// template, relaying the upstream response as a stream.
#[derive(Clone)]
pub struct CompletionService {
    store: VideoStore,
    generator: Arc<dyn TextGenerator>,
}

impl CompletionService {
    pub fn new(store: VideoStore, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    /// Substitute the transcript into `template` and stream the generated
    /// text. All validation happens before the upstream capability is
    /// contacted.
    pub async fn complete(
        &self,
        video_id: Uuid,
        template: &str,
        temperature: f32,
    ) -> Result<TextStream> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(VidscribeError::Validation(format!(
                "temperature must be between 0 and 1, got {}",
                temperature
            )));
        }

        let record = self
            .store
            .get(video_id)
            .await
            .ok_or_else(|| VidscribeError::NotFound(format!("video {}", video_id)))?;

        let transcription = record
            .transcription
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                VidscribeError::Validation(format!(
                    "video {} has no transcription yet",
                    video_id
                ))
            })?;

        let prompt = render_template(template, &transcription);
        debug!(video_id = %video_id, prompt_chars = prompt.len(), "Submitting completion prompt");

        let stream = self
            .generator
            .complete_stream(vec![ChatMessage::user(prompt)], temperature)
            .await?;

        info!(video_id = %video_id, temperature, "Completion stream opened");

        Ok(stream)
    }
}

/// Replace the transcript placeholder in a prompt template. Substitution is
/// best-effort: a template without the placeholder is sent unmodified.
pub fn render_template(template: &str, transcription: &str) -> String {
    template.replace(TRANSCRIPTION_PLACEHOLDER, transcription)
}
