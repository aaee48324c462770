use crate::infrastructure::google::GoogleApiError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for the externally owned item documents.
/// Only partial updates: documents are never created or deleted here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Set `multimedia.itemDescriptionAudioPath` and stamp
    /// `lastTextToSpeechDate` with the server time.
    ///
    /// Returns the server-assigned timestamp
    async fn record_description_audio(
        &self,
        item_id: &str,
        audio_path: &str,
    ) -> Result<DateTime<Utc>, GoogleApiError>;
}
