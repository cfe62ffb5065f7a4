pub mod completion;
pub mod providers;

pub use completion::CompletionService;
pub use providers::OpenAiGenerator;

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;

/// Ordered stream of generated text chunks relayed from the upstream
/// capability. Chunks already yielded stay delivered even if a later item
/// carries an error.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Chat message for text-generation requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// External text-generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submit messages and relay the streamed response in arrival order
    async fn complete_stream(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<TextStream>;
}
