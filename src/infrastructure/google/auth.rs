use super::error::{ensure_success, GoogleApiError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use yup_oauth2::{authenticator::DefaultAuthenticator, ServiceAccountAuthenticator};

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before the server-reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of OAuth2 bearer tokens for the Google REST clients.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, GoogleApiError>;

    /// Short name for logs and readiness output
    fn kind(&self) -> &'static str;
}

/// Fixed token, for emulators and local runs against a pre-minted token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, GoogleApiError> {
        Ok(self.token.clone())
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

/// Service-account JSON key, exchanged through yup-oauth2 (which caches
/// and refreshes the token itself).
pub struct ServiceAccountTokenProvider {
    auth: DefaultAuthenticator,
}

impl ServiceAccountTokenProvider {
    pub async fn from_key_file(path: &Path) -> Result<Self, GoogleApiError> {
        let key = yup_oauth2::read_service_account_key(path).await.map_err(|e| {
            GoogleApiError::Credentials(format!(
                "failed to read service account key {}: {}",
                path.display(),
                e
            ))
        })?;

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| {
                GoogleApiError::Credentials(format!("failed to build authenticator: {}", e))
            })?;

        Ok(Self { auth })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, GoogleApiError> {
        let token = self
            .auth
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| GoogleApiError::Credentials(e.to_string()))?;

        Ok(token.as_str().to_string())
    }

    fn kind(&self) -> &'static str {
        "service_account"
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Default service account of the runtime (Cloud Run, Cloud Functions, GCE),
/// fetched from the instance metadata server.
pub struct MetadataServerTokenProvider {
    http_client: reqwest::Client,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerTokenProvider {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_url(http_client, METADATA_TOKEN_URL.to_string())
    }

    pub fn with_url(http_client: reqwest::Client, token_url: String) -> Self {
        Self {
            http_client,
            token_url,
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<MetadataToken, GoogleApiError> {
        let response = self
            .http_client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let token = ensure_success("metadata", response)
            .await?
            .json::<MetadataToken>()
            .await?;

        tracing::debug!(expires_in = token.expires_in, "Fetched metadata server token");

        Ok(token)
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataServerTokenProvider {
    async fn access_token(&self) -> Result<String, GoogleApiError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(fresh.access_token)
    }

    fn kind(&self) -> &'static str {
        "metadata_server"
    }
}
