//! API-key authentication middleware.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::ApiState;

/// Reject the request with 401 unless it carries the configured key.
pub async fn require_api_key(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    if is_authorized(&state.api_key, req.headers(), req.uri()) {
        debug!("{} {}", req.method(), req.uri().path());
        return next.run(req).await;
    }

    debug!("Rejected unauthenticated {} {}", req.method(), req.uri().path());
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

/// Either credential may match; both are compared in constant time.
pub fn is_authorized(api_key: &str, headers: &HeaderMap, uri: &Uri) -> bool {
    bearer_token(headers)
        .into_iter()
        .chain(query_token(uri))
        .any(|token| keys_match(api_key, token))
}

fn keys_match(expected: &str, presented: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Raw `api_key` query value; not percent-decoded
fn query_token(uri: &Uri) -> Option<&str> {
    uri.query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("api_key="))
}
