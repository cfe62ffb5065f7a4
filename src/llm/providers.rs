use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{ChatMessage, TextGenerator, TextStream};
use crate::config::LlmConfig;
use crate::error::{Result, VidscribeError};

/// OpenAI chat-completions provider with streamed responses
#[derive(Debug)]
pub struct OpenAiGenerator {
    config: LlmConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            VidscribeError::Configuration("text-generation API key not configured".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| VidscribeError::Configuration(e.to_string()))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Parse the text chunks out of a server-sent-events payload.
    /// `buf` carries raw bytes over to the next network chunk, so a frame
    /// (or a multi-byte character) split across chunk boundaries is only
    /// decoded once it is complete.
    fn drain_sse_lines(buf: &mut Vec<u8>) -> Vec<Result<String>> {
        let mut out = Vec::new();

        while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            if let Some(data) = line.strip_prefix("data: ") {
                if data == "[DONE]" {
                    continue;
                }
                match serde_json::from_str::<ChatCompletionChunk>(data) {
                    Ok(chunk) => {
                        if let Some(content) = chunk
                            .choices
                            .first()
                            .and_then(|choice| choice.delta.content.clone())
                        {
                            out.push(Ok(content));
                        }
                    }
                    Err(e) => {
                        warn!("Discarding malformed SSE frame: {}", e);
                    }
                }
            }
        }

        out
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn complete_stream(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<TextStream> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature,
            stream: true,
        };

        debug!(model = %self.config.model, "Requesting streamed chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VidscribeError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VidscribeError::Upstream(format!(
                "chat completion failed with HTTP {}: {}",
                status, body
            )));
        }

        // Relay chunks in arrival order. A transport error mid-stream is
        // surfaced as the final item; earlier chunks stay delivered. A
        // trailing `None` marks end of stream so leftover bytes get noticed.
        let token_stream = response
            .bytes_stream()
            .map(Some)
            .chain(futures::stream::once(futures::future::ready(None)))
            .scan(Vec::new(), |buf: &mut Vec<u8>, chunk| {
                let items = match chunk {
                    Some(Ok(bytes)) => {
                        buf.extend_from_slice(&bytes);
                        Self::drain_sse_lines(buf)
                    }
                    Some(Err(e)) => vec![Err(VidscribeError::Upstream(e.to_string()))],
                    None => {
                        if !buf.is_empty() {
                            warn!(
                                "Stream ended with {} unterminated bytes in buffer",
                                buf.len()
                            );
                        }
                        Vec::new()
                    }
                };
                futures::future::ready(Some(futures::stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(token_stream))
    }
}
