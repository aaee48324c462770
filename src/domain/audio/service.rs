use super::error::AudioPipelineError;
use super::request::SynthesisRequest;
use super::scratch::ScratchAudio;
use super::voice::{AudioSettings, VoiceProfile, VoiceTier};
use crate::infrastructure::repositories::{
    content_type_for_path, ItemRepository, ObjectMetadata, ObjectStorageRepository,
    TtsRepository, ONE_YEAR_CACHE_CONTROL,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Result of one completed publication
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPublication {
    pub bucket: String,
    pub storage_path: String,
    pub record_audio_path: String,
    pub voice_tier: VoiceTier,
    pub audio_size_bytes: usize,
    pub generation: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

pub struct AudioSynthesisService {
    tts_repo: Arc<dyn TtsRepository>,
    storage_repo: Arc<dyn ObjectStorageRepository>,
    item_repo: Arc<dyn ItemRepository>,
    audio_settings: AudioSettings,
    scratch_dir: PathBuf,
}

impl AudioSynthesisService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        storage_repo: Arc<dyn ObjectStorageRepository>,
        item_repo: Arc<dyn ItemRepository>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            tts_repo,
            storage_repo,
            item_repo,
            audio_settings: AudioSettings::default(),
            scratch_dir,
        }
    }
}

#[async_trait]
pub trait AudioSynthesisApi: Send + Sync {
    /// Turn an item description into stored audio and record its path
    ///
    /// This operation:
    /// - Synthesizes with the Wavenet voice, falling back once to Standard
    /// - Writes the audio to a per-invocation scratch file
    /// - Uploads it privately to the location bucket (created if absent)
    /// - Re-asserts bucket privacy (best effort)
    /// - Updates the item record, only after the upload is confirmed
    async fn publish(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioPublication, AudioPipelineError>;
}

#[async_trait]
impl AudioSynthesisApi for AudioSynthesisService {
    async fn publish(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioPublication, AudioPipelineError> {
        tracing::info!(
            item_id = %request.item_id,
            location_id = %request.location_id,
            language = %request.language_code,
            text_length = request.description_text.len(),
            "Audio synthesis request"
        );

        // 1. Synthesize (primary voice, then fallback)
        let (audio, voice_tier) = self.synthesize_with_fallback(request).await?;

        // 2. Scratch file, removed when `scratch` drops
        let scratch = ScratchAudio::write(&self.scratch_dir, &request.item_id, &audio)
            .await
            .map_err(AudioPipelineError::Scratch)?;

        // 3. Bucket for the location
        let bucket = request.location_id.as_str();
        self.ensure_bucket(bucket).await?;

        // 4. Upload, private from the start
        let storage_path = request.storage_path();
        let metadata = ObjectMetadata {
            content_type: content_type_for_path(storage_path.as_str()),
            cache_control: ONE_YEAR_CACHE_CONTROL.to_string(),
        };
        let stored = self
            .storage_repo
            .upload_object(bucket, storage_path.as_str(), scratch.path(), &metadata)
            .await
            .map_err(|source| AudioPipelineError::Upload {
                path: storage_path.to_string(),
                source,
            })?;
        drop(scratch);

        tracing::info!(
            bucket = bucket,
            object = %stored.name,
            generation = ?stored.generation,
            "Audio uploaded"
        );

        // 5. Privacy is re-asserted after the upload; failures are not fatal
        if let Err(e) = self.storage_repo.make_bucket_private(bucket).await {
            tracing::warn!(bucket = bucket, error = %e, "Failed to make bucket private");
        }

        // 6. Record update, gated on the confirmed upload above
        let record_audio_path = request.record_audio_path();
        let recorded_at = self
            .item_repo
            .record_description_audio(&request.item_id, &record_audio_path)
            .await
            .map_err(|source| AudioPipelineError::Record {
                item_id: request.item_id.clone(),
                source,
            })?;

        Ok(AudioPublication {
            bucket: bucket.to_string(),
            storage_path: storage_path.to_string(),
            record_audio_path,
            voice_tier,
            audio_size_bytes: audio.len(),
            generation: stored.generation,
            recorded_at,
        })
    }
}

impl AudioSynthesisService {
    async fn synthesize_with_fallback(
        &self,
        request: &SynthesisRequest,
    ) -> Result<(Vec<u8>, VoiceTier), AudioPipelineError> {
        let [primary, fallback] = VoiceProfile::fallback_chain(&request.language_code);
        let text = request.description_text.as_str();

        let primary_error = match self
            .tts_repo
            .synthesize(text, &primary, &self.audio_settings)
            .await
        {
            Ok(audio) => return Ok((audio, primary.tier)),
            Err(e) => e,
        };

        tracing::warn!(
            voice = %primary.name,
            fallback_voice = %fallback.name,
            error = %primary_error,
            "Synthesis failed, trying fallback voice"
        );

        match self
            .tts_repo
            .synthesize(text, &fallback, &self.audio_settings)
            .await
        {
            Ok(audio) => Ok((audio, fallback.tier)),
            Err(fallback_error) => {
                tracing::error!(
                    item_id = %request.item_id,
                    language = %request.language_code,
                    primary_error = %primary_error,
                    fallback_error = %fallback_error,
                    "Synthesis failed: all voice profiles failed"
                );
                Err(AudioPipelineError::Synthesis {
                    primary: primary_error,
                    fallback: fallback_error,
                })
            }
        }
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), AudioPipelineError> {
        let to_error = |source| AudioPipelineError::Bucket {
            bucket: bucket.to_string(),
            source,
        };

        if !self.storage_repo.bucket_exists(bucket).await.map_err(to_error)? {
            self.storage_repo
                .create_bucket(bucket)
                .await
                .map_err(to_error)?;
        }

        Ok(())
    }
}
