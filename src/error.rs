use thiserror::Error;

/// Result type for vidscribe operations
pub type Result<T> = std::result::Result<T, VidscribeError>;

/// Error types for the upload/transcription/completion pipeline
#[derive(Error, Debug)]
pub enum VidscribeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("audio extraction failed: {0}")]
    Extraction(String),
}

impl VidscribeError {
    /// Short machine-readable kind, used in API error payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VidscribeError::Validation(_) => "validation",
            VidscribeError::NotFound(_) => "not_found",
            VidscribeError::Storage(_) => "storage",
            VidscribeError::Upstream(_) => "upstream",
            VidscribeError::Configuration(_) => "configuration",
            VidscribeError::Extraction(_) => "extraction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(VidscribeError::Validation("x".into()).kind(), "validation");
        assert_eq!(VidscribeError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(VidscribeError::Upstream("x".into()).kind(), "upstream");
    }

    #[test]
    fn test_io_error_converts_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: VidscribeError = io.into();
        assert_eq!(err.kind(), "storage");
    }
}
