use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";
pub const DEFAULT_ITEMS_COLLECTION: &str = "items";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Google Cloud
    pub gcp_project_id: String,
    pub credentials_file: Option<PathBuf>,
    pub static_access_token: Option<String>,
    pub tts_endpoint: String,
    pub storage_endpoint: String,
    pub firestore_endpoint: String,
    pub items_collection: String,
    // Handler
    pub scratch_dir: PathBuf,
    pub pubsub_verification_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let gcp_project_id = env::var("GCP_PROJECT_ID")
            .or_else(|_| env::var("GOOGLE_CLOUD_PROJECT"))
            .map_err(|_| "GCP_PROJECT_ID (or GOOGLE_CLOUD_PROJECT) must be set")?;

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            gcp_project_id,
            credentials_file: optional_var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            static_access_token: optional_var("GOOGLE_ACCESS_TOKEN"),
            tts_endpoint: endpoint_var("TTS_ENDPOINT", DEFAULT_TTS_ENDPOINT),
            storage_endpoint: endpoint_var("STORAGE_ENDPOINT", DEFAULT_STORAGE_ENDPOINT),
            firestore_endpoint: endpoint_var("FIRESTORE_ENDPOINT", DEFAULT_FIRESTORE_ENDPOINT),
            items_collection: env::var("ITEMS_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_ITEMS_COLLECTION.to_string()),
            scratch_dir: optional_var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("synthesized")),
            pubsub_verification_token: optional_var("PUBSUB_VERIFICATION_TOKEN"),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Empty values count as unset so `.env` templates can leave keys blank.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn endpoint_var(key: &str, default: &str) -> String {
    optional_var(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
