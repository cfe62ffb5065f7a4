use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, VidscribeError};

/// Configuration for the vidscribe service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Audio storage settings
    pub storage: StorageConfig,

    /// Speech-to-text settings
    pub transcription: TranscriptionConfig,

    /// Text-generation settings
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where audio files and metadata records are kept
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// API key for the speech-to-text service
    pub api_key: Option<String>,

    /// Base URL of the speech-to-text API
    pub api_base: String,

    /// Model to use for transcription
    pub model: String,

    /// Language hint for transcription
    pub language: Option<String>,

    /// Timeout for transcription requests (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the text-generation service
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API
    pub api_base: String,

    /// Model to use for generation
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Timeout for completion requests (seconds)
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        let config_paths = ["vidscribe.toml", "config/vidscribe.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        return config.apply_env();
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::default().apply_env()
    }

    /// Override settings from environment variables
    pub fn apply_env(mut self) -> Self {
        if let Ok(port) = std::env::var("VIDSCRIBE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(data_dir) = std::env::var("VIDSCRIBE_STORAGE_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        // Both upstream capabilities share the OpenAI credential
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.transcription.api_key = Some(api_key.clone());
            self.llm.api_key = Some(api_key);
        }

        self
    }

    /// Validate configuration. Upstream-dependent operations must fail fast
    /// when credentials are absent, so this runs before the server starts.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_upload_bytes == 0 {
            return Err(VidscribeError::Configuration(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        if self.transcription.api_key.is_none() {
            return Err(VidscribeError::Configuration(
                "transcription API key missing (set OPENAI_API_KEY)".to_string(),
            ));
        }

        if self.llm.api_key.is_none() {
            return Err(VidscribeError::Configuration(
                "text-generation API key missing (set OPENAI_API_KEY)".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3333,
                max_upload_bytes: 1024 * 1024 * 1024, // 1 GiB upload cap
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("./data"),
            },
            transcription: TranscriptionConfig {
                api_key: None,
                api_base: "https://api.openai.com/v1".to_string(),
                model: "whisper-1".to_string(),
                language: Some("en".to_string()),
                timeout_seconds: 300,
            },
            llm: LlmConfig {
                api_key: None,
                api_base: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo-16k".to_string(),
                max_tokens: 1024,
                timeout_seconds: 120,
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.config.storage.data_dir = dir;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.transcription.api_key = Some(api_key.clone());
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_llm_model(mut self, model: String) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
