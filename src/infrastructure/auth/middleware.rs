use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;

/// Shared secret expected as `?token=` on the push endpoint URL
#[derive(Debug, Clone, Default)]
pub struct PushVerification {
    pub token: Option<String>,
}

/// Push verification middleware. A no-op when no token is configured.
pub async fn push_token_middleware(
    State(verification): State<Arc<PushVerification>>,
    Query(params): Query<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = verification.token.as_deref() {
        let provided = params
            .get("token")
            .ok_or_else(|| AppError::Unauthorized("Missing push token".to_string()))?;

        if provided != expected {
            return Err(AppError::Unauthorized("Invalid push token".to_string()));
        }
    }

    Ok(next.run(request).await)
}
