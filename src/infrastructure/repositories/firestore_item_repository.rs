use super::item_repository::ItemRepository;
use crate::infrastructure::google::error::ensure_success;
use crate::infrastructure::google::{AccessTokenProvider, GoogleApiError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const SERVICE: &str = "firestore";

pub const AUDIO_PATH_FIELD: &str = "multimedia.itemDescriptionAudioPath";
pub const LAST_TTS_DATE_FIELD: &str = "lastTextToSpeechDate";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
    commit_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<TransformResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformResult {
    timestamp_value: Option<DateTime<Utc>>,
}

impl CommitResponse {
    /// Value the server wrote for the timestamp transform, else the commit time
    fn server_timestamp(&self) -> DateTime<Utc> {
        self.write_results
            .first()
            .and_then(|w| w.transform_results.first())
            .and_then(|t| t.timestamp_value)
            .unwrap_or(self.commit_time)
    }
}

/// Firestore (REST v1) implementation of the item repository
pub struct FirestoreItemRepository {
    http_client: reqwest::Client,
    token_provider: Arc<dyn AccessTokenProvider>,
    endpoint: String,
    project_id: String,
    collection: String,
}

impl FirestoreItemRepository {
    pub fn new(
        http_client: reqwest::Client,
        token_provider: Arc<dyn AccessTokenProvider>,
        endpoint: String,
        project_id: String,
        collection: String,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            endpoint,
            project_id,
            collection,
        }
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }

    fn document_name(&self, item_id: &str) -> String {
        format!(
            "{}/documents/{}/{}",
            self.database_path(),
            self.collection,
            item_id
        )
    }

    fn commit_url(&self) -> String {
        format!("{}/v1/{}/documents:commit", self.endpoint, self.database_path())
    }

    /// Single write: masked update of the nested audio path, server-time
    /// transform on the date field, and an exists precondition so a missing
    /// item is an error instead of a new document.
    fn commit_body(&self, item_id: &str, audio_path: &str) -> Value {
        json!({
            "writes": [{
                "update": {
                    "name": self.document_name(item_id),
                    "fields": {
                        "multimedia": {
                            "mapValue": {
                                "fields": {
                                    "itemDescriptionAudioPath": { "stringValue": audio_path }
                                }
                            }
                        }
                    }
                },
                "updateMask": { "fieldPaths": [AUDIO_PATH_FIELD] },
                "updateTransforms": [{
                    "fieldPath": LAST_TTS_DATE_FIELD,
                    "setToServerValue": "REQUEST_TIME"
                }],
                "currentDocument": { "exists": true }
            }]
        })
    }
}

#[async_trait]
impl ItemRepository for FirestoreItemRepository {
    async fn record_description_audio(
        &self,
        item_id: &str,
        audio_path: &str,
    ) -> Result<DateTime<Utc>, GoogleApiError> {
        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .post(self.commit_url())
            .bearer_auth(token)
            .json(&self.commit_body(item_id, audio_path))
            .send()
            .await?;

        let commit = ensure_success(SERVICE, response)
            .await?
            .json::<CommitResponse>()
            .await?;
        let updated_at = commit.server_timestamp();

        tracing::info!(
            item_id = item_id,
            audio_path = audio_path,
            last_text_to_speech_date = %updated_at,
            "Item record updated"
        );

        Ok(updated_at)
    }
}
