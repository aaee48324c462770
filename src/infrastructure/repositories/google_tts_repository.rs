use super::tts_repository::TtsRepository;
use crate::domain::audio::{AudioEncoding, AudioSettings, SsmlGender, VoiceProfile};
use crate::infrastructure::google::error::ensure_success;
use crate::infrastructure::google::{AccessTokenProvider, GoogleApiError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SERVICE: &str = "texttospeech";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeSpeechRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams<'a> {
    language_code: &'a str,
    ssml_gender: SsmlGender,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: AudioEncoding,
    sample_rate_hertz: u32,
    effects_profile_id: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeSpeechResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech (REST v1) implementation of TTS repository
pub struct GoogleTtsRepository {
    http_client: reqwest::Client,
    token_provider: Arc<dyn AccessTokenProvider>,
    endpoint: String,
}

impl GoogleTtsRepository {
    pub fn new(
        http_client: reqwest::Client,
        token_provider: Arc<dyn AccessTokenProvider>,
        endpoint: String,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            endpoint,
        }
    }

    fn synthesize_url(&self) -> String {
        format!("{}/v1/text:synthesize", self.endpoint)
    }
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
        settings: &AudioSettings,
    ) -> Result<Vec<u8>, GoogleApiError> {
        let start_time = std::time::Instant::now();

        let request = SynthesizeSpeechRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code: &voice.language_code,
                ssml_gender: voice.gender,
                name: &voice.name,
            },
            audio_config: AudioConfig {
                audio_encoding: settings.encoding,
                sample_rate_hertz: settings.sample_rate_hertz,
                effects_profile_id: &settings.effects_profile_ids,
            },
        };

        tracing::info!(
            voice = %voice.name,
            language = %voice.language_code,
            sample_rate_hertz = settings.sample_rate_hertz,
            text_length = text.len(),
            text_preview = text.chars().take(80).collect::<String>(),
            "Calling Google text:synthesize"
        );

        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .post(self.synthesize_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let body: SynthesizeSpeechResponse = ensure_success(SERVICE, response).await?.json().await?;

        let audio = BASE64
            .decode(body.audio_content.as_bytes())
            .map_err(|e| GoogleApiError::InvalidResponse {
                service: SERVICE,
                message: format!("audioContent is not base64: {}", e),
            })?;

        tracing::info!(
            provider = "google",
            voice = %voice.name,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio.len(),
            "TTS synthesis completed"
        );

        Ok(audio)
    }
}
