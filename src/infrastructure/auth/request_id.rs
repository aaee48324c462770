use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_CLOUD_TRACE_CONTEXT: &str = "x-cloud-trace-context";

/// Middleware attaching a request ID to each request: the Cloud trace id
/// when the platform sent one, otherwise a fresh UUID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_CLOUD_TRACE_CONTEXT)
        .and_then(|v| v.to_str().ok())
        .and_then(trace_id_from_header)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, header_value);
    }

    response
}

/// `TRACE_ID/SPAN_ID;o=OPTIONS` -> `TRACE_ID`
fn trace_id_from_header(value: &str) -> Option<String> {
    let trace_id = value.split('/').next()?.trim();
    if trace_id.is_empty() || !trace_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(trace_id.to_string())
}

/// Request ID wrapper type for extension
#[derive(Debug, Clone)]
pub struct RequestId(pub String);
