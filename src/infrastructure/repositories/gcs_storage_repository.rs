use super::storage_repository::{ObjectMetadata, ObjectStorageRepository, StoredObject};
use crate::infrastructure::google::error::ensure_success;
use crate::infrastructure::google::{AccessTokenProvider, GoogleApiError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const SERVICE: &str = "storage";
const PROJECT_PRIVATE: &str = "projectPrivate";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadMetadata<'a> {
    name: &'a str,
    content_type: &'a str,
    cache_control: &'a str,
}

/// Google Cloud Storage (JSON API v1) implementation of object storage.
/// Every request is billed to the configured project (`userProject`).
pub struct GcsStorageRepository {
    http_client: reqwest::Client,
    token_provider: Arc<dyn AccessTokenProvider>,
    endpoint: String,
    project_id: String,
}

impl GcsStorageRepository {
    pub fn new(
        http_client: reqwest::Client,
        token_provider: Arc<dyn AccessTokenProvider>,
        endpoint: String,
        project_id: String,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            endpoint,
            project_id,
        }
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!("{}/storage/v1/b/{}", self.endpoint, bucket)
    }

    fn upload_url(&self, bucket: &str) -> String {
        format!("{}/upload/storage/v1/b/{}/o", self.endpoint, bucket)
    }
}

/// `multipart/related` body: JSON metadata part followed by the media part
fn multipart_related_body(
    boundary: &str,
    metadata: &UploadMetadata<'_>,
    media: &[u8],
) -> Result<Vec<u8>, serde_json::Error> {
    let metadata_json = serde_json::to_vec(metadata)?;

    let mut body = Vec::with_capacity(media.len() + metadata_json.len() + 256);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&metadata_json);
    body.extend_from_slice(
        format!(
            "\r\n--{}\r\nContent-Type: {}\r\n\r\n",
            boundary, metadata.content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Ok(body)
}

#[async_trait]
impl ObjectStorageRepository for GcsStorageRepository {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, GoogleApiError> {
        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .get(self.bucket_url(bucket))
            .bearer_auth(token)
            .query(&[("userProject", self.project_id.as_str())])
            .send()
            .await?;

        match ensure_success(SERVICE, response).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), GoogleApiError> {
        tracing::info!(bucket = bucket, project = %self.project_id, "Creating bucket");

        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .post(format!("{}/storage/v1/b", self.endpoint))
            .bearer_auth(token)
            .query(&[
                ("project", self.project_id.as_str()),
                ("predefinedAcl", PROJECT_PRIVATE),
                ("predefinedDefaultObjectAcl", PROJECT_PRIVATE),
                ("userProject", self.project_id.as_str()),
            ])
            .json(&json!({ "name": bucket }))
            .send()
            .await?;

        // Another invocation may have created it between the existence check and now
        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(bucket = bucket, "Bucket already exists");
            return Ok(());
        }

        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        source: &Path,
        metadata: &ObjectMetadata,
    ) -> Result<StoredObject, GoogleApiError> {
        let media = tokio::fs::read(source).await?;
        let boundary = format!("audio-{}", Uuid::new_v4().simple());
        let upload_metadata = UploadMetadata {
            name,
            content_type: &metadata.content_type,
            cache_control: &metadata.cache_control,
        };
        let body = multipart_related_body(&boundary, &upload_metadata, &media).map_err(|e| {
            GoogleApiError::InvalidResponse {
                service: SERVICE,
                message: format!("failed to encode object metadata: {}", e),
            }
        })?;

        tracing::info!(
            bucket = bucket,
            object = name,
            size_bytes = media.len(),
            content_type = %metadata.content_type,
            "Uploading object"
        );

        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .post(self.upload_url(bucket))
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("predefinedAcl", PROJECT_PRIVATE),
                ("userProject", self.project_id.as_str()),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;

        let stored = ensure_success(SERVICE, response)
            .await?
            .json::<StoredObject>()
            .await?;

        Ok(stored)
    }

    async fn make_bucket_private(&self, bucket: &str) -> Result<(), GoogleApiError> {
        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .patch(self.bucket_url(bucket))
            .bearer_auth(token)
            .query(&[
                ("predefinedAcl", PROJECT_PRIVATE),
                ("predefinedDefaultObjectAcl", PROJECT_PRIVATE),
                ("userProject", self.project_id.as_str()),
            ])
            .json(&json!({}))
            .send()
            .await?;

        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
