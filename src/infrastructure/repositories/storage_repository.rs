use crate::infrastructure::google::GoogleApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ONE_YEAR_CACHE_CONTROL: &str = "public, max-age=31536000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub content_type: String,
    pub cache_control: String,
}

/// Object as acknowledged by the storage service after upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub generation: Option<String>,
}

/// Repository for the per-location object storage containers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorageRepository: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, GoogleApiError>;

    /// Create a private bucket. Succeeds if it already exists.
    async fn create_bucket(&self, bucket: &str) -> Result<(), GoogleApiError>;

    /// Upload the file at `source` as `name`, private from the first byte.
    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        source: &Path,
        metadata: &ObjectMetadata,
    ) -> Result<StoredObject, GoogleApiError>;

    /// Reset bucket and default object ACLs to project-private.
    async fn make_bucket_private(&self, bucket: &str) -> Result<(), GoogleApiError>;
}

/// Content type inferred from the object name's extension
pub fn content_type_for_path(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
