use item_audio_worker::controllers::pubsub::PubSubController;
use item_audio_worker::domain::audio::AudioSynthesisService;
use item_audio_worker::infrastructure::config::{Config, LogFormat};
use item_audio_worker::infrastructure::google::{
    AccessTokenProvider, MetadataServerTokenProvider, ServiceAccountTokenProvider,
    StaticTokenProvider,
};
use item_audio_worker::infrastructure::http::start_http_server;
use item_audio_worker::infrastructure::repositories::{
    FirestoreItemRepository, GcsStorageRepository, GoogleTtsRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        project = %config.gcp_project_id,
        "Starting item audio worker on {}:{}",
        config.host,
        config.port
    );

    // === LONG-LIVED CLIENTS ===
    // Built once and shared by every invocation, in this order:
    // 1. HTTP client, 2. credentials, 3. repositories, 4. service, 5. controller.
    let http_client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let token_provider = create_token_provider(&config, http_client.clone()).await?;
    tracing::info!(
        credentials_source = token_provider.kind(),
        "Google credentials initialized"
    );

    tracing::info!("Instantiating repositories...");
    let tts_repo = Arc::new(GoogleTtsRepository::new(
        http_client.clone(),
        token_provider.clone(),
        config.tts_endpoint.clone(),
    ));
    let storage_repo = Arc::new(GcsStorageRepository::new(
        http_client.clone(),
        token_provider.clone(),
        config.storage_endpoint.clone(),
        config.gcp_project_id.clone(),
    ));
    let item_repo = Arc::new(FirestoreItemRepository::new(
        http_client,
        token_provider.clone(),
        config.firestore_endpoint.clone(),
        config.gcp_project_id.clone(),
        config.items_collection.clone(),
    ));

    tracing::info!(scratch_dir = %config.scratch_dir.display(), "Instantiating services...");
    let audio_service = Arc::new(AudioSynthesisService::new(
        tts_repo,
        storage_repo,
        item_repo,
        config.scratch_dir.clone(),
    ));

    let pubsub_controller = Arc::new(PubSubController::new(audio_service));

    if config.pubsub_verification_token.is_none() && !config.is_development() {
        tracing::warn!("PUBSUB_VERIFICATION_TOKEN is not set; push endpoint is unauthenticated");
    }

    start_http_server(Arc::new(config), token_provider, pubsub_controller).await?;

    Ok(())
}

/// Static token, then service-account key, then the metadata server
async fn create_token_provider(
    config: &Config,
    http_client: reqwest::Client,
) -> Result<Arc<dyn AccessTokenProvider>, Box<dyn std::error::Error>> {
    if let Some(token) = &config.static_access_token {
        tracing::warn!("Using static GOOGLE_ACCESS_TOKEN; tokens will not be refreshed");
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }

    if let Some(path) = &config.credentials_file {
        tracing::info!(key_file = %path.display(), "Loading service account key");
        let provider = ServiceAccountTokenProvider::from_key_file(path).await?;
        return Ok(Arc::new(provider));
    }

    Ok(Arc::new(MetadataServerTokenProvider::new(http_client)))
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "item_audio_worker=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "item_audio_worker=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
