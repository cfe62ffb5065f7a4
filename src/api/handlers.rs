//! Route handlers

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use futures::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::models::{
    CompletionRequest, CreateTranscriptionRequest, TranscriptionResponse, UploadResponse,
    VideoView,
};
use super::server::AppState;
use crate::error::{Result, VidscribeError};
use crate::prompts::PromptTemplate;

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /prompts` - fixed catalog of prompt templates
pub async fn list_prompts(State(state): State<AppState>) -> Json<Vec<PromptTemplate>> {
    Json(state.prompts.list().to_vec())
}

/// `POST /videos` - multipart upload, field `file`
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VidscribeError::Validation(format!("failed to read multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("audio.mp3").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| VidscribeError::Validation(format!("failed to read file: {}", e)))?;

        debug!(filename = %filename, bytes = bytes.len(), "Received upload");

        let record = state.store.accept(&bytes, &filename).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                video: VideoView::from(&record),
            }),
        ));
    }

    warn!("Upload request carried no file field");
    Err(VidscribeError::Validation("no file uploaded".to_string()))
}

/// `POST /videos/:id/transcription`
pub async fn create_transcription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateTranscriptionRequest>,
) -> Result<Json<TranscriptionResponse>> {
    let transcription = state.transcription.transcribe(id, &request.prompt).await?;
    Ok(Json(TranscriptionResponse { transcription }))
}

/// `POST /ai/complete` - streamed plain-text response.
///
/// Chunks are relayed in arrival order; an upstream failure mid-stream ends
/// the body after the bytes already delivered.
pub async fn generate_completion(
    State(state): State<AppState>,
    Json(request): Json<CompletionRequest>,
) -> Result<Response> {
    let stream = state
        .completion
        .complete(request.video_id, &request.template, request.temperature)
        .await?;

    let body_stream = stream.map(|item| item.map(axum::body::Bytes::from));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(body_stream))
        .map_err(|e| VidscribeError::Upstream(e.to_string()))?;

    Ok(response)
}
