use crate::infrastructure::google::AccessTokenProvider;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once Google credentials can mint an access token
pub async fn health_ready(
    State(token_provider): State<Arc<dyn AccessTokenProvider>>,
) -> impl IntoResponse {
    match token_provider.access_token().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "credentials": "available",
                "credentials_source": token_provider.kind()
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check could not obtain an access token");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "credentials": "unavailable",
                    "credentials_source": token_provider.kind()
                })),
            )
        }
    }
}
