use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::SpeechToText;
use crate::config::TranscriptionConfig;
use crate::error::{Result, VidscribeError};

/// OpenAI Whisper API client
#[derive(Debug)]
pub struct WhisperClient {
    config: TranscriptionConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

impl WhisperClient {
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            VidscribeError::Configuration("transcription API key not configured".to_string())
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
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: &str,
        prompt_hint: &str,
    ) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.config.api_base);

        let file_part = multipart::Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/mpeg")
            .map_err(|e| VidscribeError::Upstream(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "json")
            .text("temperature", "0")
            .part("file", file_part);

        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }

        if !prompt_hint.is_empty() {
            form = form.text("prompt", prompt_hint.to_string());
        }

        debug!(model = %self.config.model, "Sending audio to Whisper API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VidscribeError::Upstream(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(VidscribeError::Upstream(format!(
                "transcription failed with HTTP {}: {}",
                status, body
            )));
        }

        let parsed: WhisperResponse = response
            .json()
            .await
            .map_err(|e| VidscribeError::Upstream(format!("body: {}", e)))?;

        info!(chars = parsed.text.len(), "Whisper transcription completed");

        Ok(parsed.text.trim().to_string())
    }
}
