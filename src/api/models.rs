//! API data models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VidscribeError;
use crate::store::VideoRecord;

/// Video fields exposed over the API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub transcribed: bool,
}

impl From<&VideoRecord> for VideoView {
    fn from(record: &VideoRecord) -> Self {
        Self {
            id: record.id,
            name: record.original_filename.clone(),
            created_at: record.created_at,
            transcribed: record.has_transcription(),
        }
    }
}

/// Response body for `POST /videos`
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub video: VideoView,
}

/// Request body for `POST /videos/:id/transcription`
#[derive(Debug, Deserialize)]
pub struct CreateTranscriptionRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Response body for `POST /videos/:id/transcription`
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

/// Request body for `POST /ai/complete`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub video_id: Uuid,
    pub template: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.5
}

/// API error payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl IntoResponse for VidscribeError {
    fn into_response(self) -> Response {
        let status = match &self {
            VidscribeError::Validation(_) => StatusCode::BAD_REQUEST,
            VidscribeError::NotFound(_) => StatusCode::NOT_FOUND,
            VidscribeError::Upstream(_) => StatusCode::BAD_GATEWAY,
            VidscribeError::Storage(_)
            | VidscribeError::Configuration(_)
            | VidscribeError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_defaults_temperature() {
        let req: CompletionRequest = serde_json::from_str(
            r#"{"videoId":"6dbd49fe-94e6-4bbc-bc23-8002c2f96d67","template":"t"}"#,
        )
        .unwrap();
        assert_eq!(req.temperature, 0.5);
    }

    #[test]
    fn test_error_status_mapping() {
        let resp = VidscribeError::Validation("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = VidscribeError::NotFound("gone".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = VidscribeError::Upstream("down".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
