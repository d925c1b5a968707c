//! REST API handlers.
//!
//! Each handler calls into the shared `FailoverEngine` and returns JSON.
//! Request bodies are read as raw bytes so that an empty body can be
//! treated as `{}`.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use wanfo_core::ManualSwitch;

use crate::ApiState;

fn error_response(msg: impl Into<String>, status: StatusCode) -> Response {
    (status, Json(json!({ "error": msg.into() }))).into_response()
}

fn failure(msg: impl Into<String>, status: StatusCode) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": msg.into() })),
    )
        .into_response()
}

/// Parse a JSON object body; empty means `{}`
fn parse_body(body: &Bytes) -> Result<Map<String, Value>, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(error_response(
            "Request body must be a JSON object",
            StatusCode::BAD_REQUEST,
        )),
        Err(e) => Err(error_response(
            format!("Invalid JSON body: {}", e),
            StatusCode::BAD_REQUEST,
        )),
    }
}

/// GET /api/status
pub async fn status(State(state): State<ApiState>) -> Response {
    Json(state.engine.status().await).into_response()
}

/// GET /api/health
pub async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// POST /api/switch
pub async fn switch(State(state): State<ApiState>, body: Bytes) -> Response {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let target = body.get("target").and_then(Value::as_str).unwrap_or("");
    if target.is_empty() {
        return failure("Missing 'target' in body", StatusCode::BAD_REQUEST);
    }

    debug!("Manual switch requested: {}", target);
    match state.engine.manual_switch(target).await {
        Ok(ManualSwitch::Switched { to, .. }) => {
            Json(json!({ "success": true, "active": to })).into_response()
        }
        Ok(ManualSwitch::AlreadyActive { label, .. }) => Json(json!({
            "success": true,
            "message": format!("Already on {}", label),
        }))
        .into_response(),
        Err(e) if e.is_validation() => failure(e.to_string(), StatusCode::BAD_REQUEST),
        Err(e) => {
            warn!("Manual switch to {} failed: {}", target, e);
            failure(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/auto
pub async fn auto_mode(State(state): State<ApiState>, body: Bytes) -> Response {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let enabled = match body.get("enabled") {
        None | Some(Value::Null) => {
            return error_response("Missing 'enabled' in body", StatusCode::BAD_REQUEST);
        }
        Some(Value::Bool(enabled)) => *enabled,
        Some(_) => {
            return error_response("'enabled' must be a boolean", StatusCode::BAD_REQUEST);
        }
    };

    state.engine.set_auto_mode(enabled).await;
    Json(json!({ "success": true, "auto_enabled": enabled })).into_response()
}

/// Unknown path or method
pub async fn not_found() -> Response {
    error_response("Not found", StatusCode::NOT_FOUND)
}
