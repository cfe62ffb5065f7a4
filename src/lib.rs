/// vidscribe
///
/// Upload a video, extract its audio track, transcribe it through an
/// external speech-to-text capability and generate text from the transcript
/// through a streamed chat-completion capability.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod store;
pub mod transcription;
pub mod workflow;

// Re-export main types for easy access
pub use crate::audio::AudioExtractor;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Result, VidscribeError};
pub use crate::llm::{ChatMessage, CompletionService, OpenAiGenerator, TextGenerator, TextStream};
pub use crate::prompts::{PromptCatalog, PromptTemplate, TRANSCRIPTION_PLACEHOLDER};
pub use crate::store::{VideoRecord, VideoStore};
pub use crate::transcription::{SpeechToText, TranscriptionService, WhisperClient};
pub use crate::workflow::{UploadOutcome, UploadState, UploadWorkflow};
