use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    domain::audio::{AudioSynthesisApi, SynthesisRequest},
    error::{AppError, AppResult},
};

/// Pub/Sub push delivery body
#[derive(Debug, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// Base64 payload; unused, the job is carried entirely in attributes
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub publish_time: Option<String>,
}

pub struct PubSubController {
    audio_service: Arc<dyn AudioSynthesisApi>,
}

impl PubSubController {
    pub fn new(audio_service: Arc<dyn AudioSynthesisApi>) -> Self {
        Self { audio_service }
    }

    /// POST /pubsub/push - Generate and store the description audio of an item
    ///
    /// 204 acknowledges the message (done, or malformed and not worth
    /// redelivering). Any error status makes Pub/Sub redeliver it.
    pub async fn push(
        State(controller): State<Arc<PubSubController>>,
        Json(envelope): Json<PushEnvelope>,
    ) -> AppResult<StatusCode> {
        let message_id = envelope
            .message
            .message_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = tracing::info_span!(
            "pubsub_message",
            message_id = %message_id,
            subscription = envelope.subscription.as_deref().unwrap_or("unknown"),
        );

        async move {
            let request = match SynthesisRequest::from_attributes(&envelope.message.attributes) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attribute_keys = ?envelope.message.attributes.keys().collect::<Vec<_>>(),
                        "Dropping malformed text-to-speech event"
                    );
                    return Ok(StatusCode::NO_CONTENT);
                }
            };

            let publication = controller
                .audio_service
                .publish(&request)
                .await
                .map_err(AppError::from)?;

            tracing::info!(
                item_id = %request.item_id,
                bucket = %publication.bucket,
                object = %publication.storage_path,
                voice_tier = %publication.voice_tier,
                audio_size_bytes = publication.audio_size_bytes,
                recorded_at = %publication.recorded_at,
                "Item description audio published"
            );

            Ok(StatusCode::NO_CONTENT)
        }
        .instrument(span)
        .await
    }
}
