use crate::domain::audio::{AudioSettings, VoiceProfile};
use crate::infrastructure::google::GoogleApiError;
use async_trait::async_trait;

/// Repository for speech synthesis.
/// Abstracts the synthesis provider behind a single call per voice profile;
/// fallback between profiles is the caller's policy, not the provider's.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize `text` with exactly one voice profile
    ///
    /// Returns the encoded audio (MP3 for the default settings)
    ///
    /// # Errors
    /// Any provider failure, including unknown voice names and quota errors
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
        settings: &AudioSettings,
    ) -> Result<Vec<u8>, GoogleApiError>;
}
