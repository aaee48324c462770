use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, pubsub::PubSubController};
use crate::infrastructure::auth::{push_token_middleware, request_id_middleware, PushVerification};
use crate::infrastructure::config::Config;
use crate::infrastructure::google::AccessTokenProvider;

/// Build the application router
pub fn build_router(
    token_provider: Arc<dyn AccessTokenProvider>,
    verification: Arc<PushVerification>,
    pubsub_controller: Arc<PubSubController>,
) -> Router {
    // Push route (shared-secret verification when configured)
    let push_routes = Router::new()
        .route("/pubsub/push", post(PubSubController::push))
        .with_state(pubsub_controller)
        .layer(middleware::from_fn_with_state(
            verification,
            push_token_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(token_provider)
        .merge(push_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware)),
        )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    token_provider: Arc<dyn AccessTokenProvider>,
    pubsub_controller: Arc<PubSubController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let verification = Arc::new(PushVerification {
        token: config.pubsub_verification_token.clone(),
    });
    let app = build_router(token_provider, verification, pubsub_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
