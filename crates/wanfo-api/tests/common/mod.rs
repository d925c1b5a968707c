//! Test doubles for driving the API router against a real engine

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use wanfo_api::{ApiState, build_router};
use wanfo_core::traits::{GatewayResolver, Probe, RouteController};
use wanfo_core::{Error, FailoverConfig, FailoverEngine, Link, LinkConfig, Result};

pub const API_KEY: &str = "test-api-key";

/// Two always-reachable links; routes can be made to fail
#[derive(Debug, Clone, Default)]
pub struct FakeNetwork {
    fail_routes: Arc<Mutex<bool>>,
    gateways: Arc<Mutex<HashMap<String, IpAddr>>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        let net = Self::default();
        {
            let mut gateways = net.gateways.lock().unwrap();
            gateways.insert("eth0".to_string(), IpAddr::from([192, 168, 1, 1]));
            gateways.insert("eth1".to_string(), IpAddr::from([192, 168, 8, 1]));
        }
        net
    }

    pub fn fail_routes(&self, fail: bool) {
        *self.fail_routes.lock().unwrap() = fail;
    }

    pub fn forget_gateway(&self, iface: &str) {
        self.gateways.lock().unwrap().remove(iface);
    }
}

#[async_trait::async_trait]
impl Probe for FakeNetwork {
    async fn probe_internet(&self, _link: &Link) -> bool {
        true
    }

    async fn probe_gateway(&self, link: &Link) -> bool {
        link.gateway().is_some()
    }
}

#[async_trait::async_trait]
impl GatewayResolver for FakeNetwork {
    async fn resolve_gateway(&self, interface: &str) -> Option<IpAddr> {
        self.gateways.lock().unwrap().get(interface).copied()
    }
}

#[async_trait::async_trait]
impl RouteController for FakeNetwork {
    async fn replace_default_route(&self, _interface: &str, _gateway: IpAddr) -> Result<()> {
        if *self.fail_routes.lock().unwrap() {
            return Err(Error::route_switch("Cannot find device"));
        }
        Ok(())
    }

    async fn current_default_interface(&self) -> Option<String> {
        Some("eth0".to_string())
    }
}

pub fn test_config() -> FailoverConfig {
    let mut config = FailoverConfig::new();
    config.primary = LinkConfig::new("primary", "eth0").with_display_name("Fiber");
    config.secondary = LinkConfig::new("secondary", "eth1").with_display_name("LTE");
    config.api.api_key = API_KEY.to_string();
    config
}

/// Router plus a handle on the engine behind it
pub async fn test_app(net: &FakeNetwork) -> (Router, Arc<FailoverEngine>) {
    let config = test_config();
    let engine = Arc::new(
        FailoverEngine::new(
            Box::new(net.clone()),
            Box::new(net.clone()),
            Box::new(net.clone()),
            &config,
        )
        .await
        .expect("engine construction succeeds"),
    );
    let router = build_router(ApiState::new(Arc::clone(&engine), API_KEY));
    (router, engine)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", API_KEY))
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", API_KEY))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request and decode the JSON response
pub async fn call(router: &Router, req: Request<Body>) -> (u16, Value) {
    let resp: Response<Body> = router.clone().oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
