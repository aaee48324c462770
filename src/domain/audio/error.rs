use super::request::AttributeError;
use crate::error::AppError;
use crate::infrastructure::google::GoogleApiError;

#[derive(Debug, thiserror::Error)]
pub enum AudioPipelineError {
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] AttributeError),

    #[error("all voice profiles failed (wavenet: {primary}; standard: {fallback})")]
    Synthesis {
        primary: GoogleApiError,
        fallback: GoogleApiError,
    },

    #[error("scratch file: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("bucket '{bucket}': {source}")]
    Bucket {
        bucket: String,
        #[source]
        source: GoogleApiError,
    },

    #[error("upload of '{path}': {source}")]
    Upload {
        path: String,
        #[source]
        source: GoogleApiError,
    },

    #[error("record update for item '{item_id}': {source}")]
    Record {
        item_id: String,
        #[source]
        source: GoogleApiError,
    },
}

impl AudioPipelineError {
    /// Redelivering a malformed event cannot succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidEvent(_))
    }
}

impl From<AudioPipelineError> for AppError {
    fn from(err: AudioPipelineError) -> Self {
        match err {
            AudioPipelineError::InvalidEvent(e) => AppError::BadRequest(e.to_string()),
            AudioPipelineError::Scratch(e) => AppError::Internal(format!("scratch file: {}", e)),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}
