//! Contract Test: REST API
//!
//! Constraints verified:
//! - Every route, unknown paths included, requires the API key
//! - Commands map onto engine operations with the documented status codes
//! - Empty bodies count as `{}`; malformed bodies are rejected

mod common;

use axum::body::Body;
use axum::http::Request;
use common::*;

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let net = FakeNetwork::new();
    let (router, _engine) = test_app(&net).await;

    for uri in ["/api/status", "/api/health", "/nope"] {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = call(&router, req).await;
        assert_eq!(status, 401, "{}", uri);
        assert_eq!(body["error"], "Unauthorized");
    }

    let req = Request::builder()
        .uri("/api/status")
        .header("authorization", "Bearer wrong-key")
        .body(Body::empty())
        .unwrap();
    assert_eq!(call(&router, req).await.0, 401);
}

#[tokio::test]
async fn query_parameter_authenticates() {
    let net = FakeNetwork::new();
    let (router, _engine) = test_app(&net).await;

    let req = Request::builder()
        .uri(format!("/api/health?api_key={}", API_KEY))
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&router, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_reports_engine_snapshot() {
    let net = FakeNetwork::new();
    let (router, _engine) = test_app(&net).await;

    let (status, body) = call(&router, get("/api/status")).await;
    assert_eq!(status, 200);
    assert_eq!(body["active_link"], "primary");
    assert_eq!(body["active_display_name"], "Fiber");
    assert_eq!(body["auto_enabled"], true);
    assert_eq!(body["primary"]["gateway"], "192.168.1.1");
    assert_eq!(body["secondary"]["interface"], "eth1");
    assert!(body["recent_events"].is_array());
}

#[tokio::test]
async fn switch_moves_active_link() {
    let net = FakeNetwork::new();
    let (router, engine) = test_app(&net).await;

    let (status, body) = call(&router, post("/api/switch", r#"{"target":"secondary"}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["active"], "secondary");
    assert_eq!(engine.status().await.active_link, "secondary");
}

#[tokio::test]
async fn switch_to_active_link_reports_already_on() {
    let net = FakeNetwork::new();
    let (router, engine) = test_app(&net).await;

    let (status, body) = call(&router, post("/api/switch", r#"{"target":"primary"}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Already on Fiber");
    assert_eq!(engine.status().await.switch_count, 0);
}

#[tokio::test]
async fn switch_rejects_bad_targets() {
    let net = FakeNetwork::new();
    let (router, engine) = test_app(&net).await;

    for body in ["", "{}", r#"{"target":""}"#, r#"{"target":42}"#] {
        let (status, json) = call(&router, post("/api/switch", body)).await;
        assert_eq!(status, 400, "body {:?}", body);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Missing 'target' in body");
    }

    let (status, json) = call(&router, post("/api/switch", r#"{"target":"tertiary"}"#)).await;
    assert_eq!(status, 400);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Unknown link: tertiary");

    let (status, _) = call(&router, post("/api/switch", "{oops")).await;
    assert_eq!(status, 400);

    assert_eq!(engine.status().await.active_link, "primary");
}

#[tokio::test]
async fn failed_route_change_is_server_error() {
    let net = FakeNetwork::new();
    net.fail_routes(true);
    let (router, engine) = test_app(&net).await;

    let (status, json) = call(&router, post("/api/switch", r#"{"target":"secondary"}"#)).await;
    assert_eq!(status, 500);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Cannot find device"));
    assert_eq!(engine.status().await.active_link, "primary");
}

#[tokio::test]
async fn switch_without_gateway_is_server_error() {
    let net = FakeNetwork::new();
    net.forget_gateway("eth1");
    let (router, _engine) = test_app(&net).await;

    let (status, json) = call(&router, post("/api/switch", r#"{"target":"secondary"}"#)).await;
    assert_eq!(status, 500);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn auto_toggle() {
    let net = FakeNetwork::new();
    let (router, engine) = test_app(&net).await;

    let (status, json) = call(&router, post("/api/auto", r#"{"enabled":false}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(json["success"], true);
    assert_eq!(json["auto_enabled"], false);
    assert!(!engine.status().await.auto_enabled);

    let (_, json) = call(&router, post("/api/auto", r#"{"enabled":true}"#)).await;
    assert_eq!(json["auto_enabled"], true);
    assert!(engine.status().await.auto_enabled);
}

#[tokio::test]
async fn auto_requires_enabled_flag() {
    let net = FakeNetwork::new();
    let (router, engine) = test_app(&net).await;

    for body in ["", "{}", r#"{"enabled":null}"#, r#"{"enabled":"yes"}"#, "not json"] {
        let (status, _) = call(&router, post("/api/auto", body)).await;
        assert_eq!(status, 400, "body {:?}", body);
    }
    assert!(engine.status().await.auto_enabled);
}

#[tokio::test]
async fn unknown_paths_and_methods_are_not_found() {
    let net = FakeNetwork::new();
    let (router, _engine) = test_app(&net).await;

    let (status, json) = call(&router, get("/api/unknown")).await;
    assert_eq!(status, 404);
    assert_eq!(json["error"], "Not found");

    assert_eq!(call(&router, get("/api/switch")).await.0, 404);
    assert_eq!(call(&router, post("/api/status", "")).await.0, 404);
}
