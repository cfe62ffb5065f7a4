//! HTTP server implementation for the API

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::Config;
use crate::error::Result;
use crate::llm::{CompletionService, OpenAiGenerator};
use crate::prompts::PromptCatalog;
use crate::store::VideoStore;
use crate::transcription::{TranscriptionService, WhisperClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: VideoStore,
    pub prompts: Arc<PromptCatalog>,
    pub transcription: Arc<TranscriptionService>,
    pub completion: Arc<CompletionService>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire up the real upstream clients from configuration. Fails fast with
    /// a configuration error when credentials are missing.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = VideoStore::new(config.storage.data_dir.clone()).await?;

        let whisper = Arc::new(WhisperClient::new(config.transcription.clone())?);
        let generator = Arc::new(OpenAiGenerator::new(config.llm.clone())?);

        Ok(Self {
            transcription: Arc::new(TranscriptionService::new(store.clone(), whisper)),
            completion: Arc::new(CompletionService::new(store.clone(), generator)),
            prompts: Arc::new(PromptCatalog::new()),
            store,
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}

/// Build the application router with routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/prompts", get(handlers::list_prompts))
        .route("/videos", post(handlers::upload_video))
        .route("/videos/:id/transcription", post(handlers::create_transcription))
        .route("/ai/complete", post(handlers::generate_completion))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState, port: u16) -> Result<()> {
    info!("Starting HTTP server on port {}", port);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
