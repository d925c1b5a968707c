//! Test doubles and common utilities for failover contract tests
//!
//! [`SimulatedNetwork`] stands in for all three collaborators at once, so a
//! test can flip a link's reachability and observe the engine's decisions
//! through the recorded route calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wanfo_core::traits::{GatewayResolver, Probe, RouteController};
use wanfo_core::{Error, FailoverConfig, FailoverEngine, Link, LinkConfig, Result};

pub const PRIMARY_IF: &str = "eth0";
pub const SECONDARY_IF: &str = "eth1";

pub fn primary_gw() -> IpAddr {
    IpAddr::from([192, 168, 1, 1])
}

pub fn secondary_gw() -> IpAddr {
    IpAddr::from([192, 168, 8, 1])
}

#[derive(Debug, Default)]
struct NetworkState {
    internet: HashMap<String, bool>,
    gateway_answers: HashMap<String, bool>,
    gateways: HashMap<String, IpAddr>,
    default_interface: Option<String>,
    fail_routes: bool,
    route_calls: Vec<(String, IpAddr)>,
    internet_probes: usize,
    probe_delay: Option<Duration>,
}

/// Shared, scriptable network used as Probe, GatewayResolver and RouteController
#[derive(Debug, Clone, Default)]
pub struct SimulatedNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl SimulatedNetwork {
    /// Both links healthy with known gateways; default route on the primary
    pub fn healthy() -> Self {
        let net = Self::default();
        {
            let mut state = net.state.lock().unwrap();
            for (iface, gw) in [(PRIMARY_IF, primary_gw()), (SECONDARY_IF, secondary_gw())] {
                state.internet.insert(iface.to_string(), true);
                state.gateway_answers.insert(iface.to_string(), true);
                state.gateways.insert(iface.to_string(), gw);
            }
            state.default_interface = Some(PRIMARY_IF.to_string());
        }
        net
    }

    pub fn set_internet(&self, iface: &str, up: bool) {
        self.state
            .lock()
            .unwrap()
            .internet
            .insert(iface.to_string(), up);
    }

    pub fn set_gateway_answers(&self, iface: &str, up: bool) {
        self.state
            .lock()
            .unwrap()
            .gateway_answers
            .insert(iface.to_string(), up);
    }

    pub fn set_gateway(&self, iface: &str, gateway: Option<IpAddr>) {
        let mut state = self.state.lock().unwrap();
        match gateway {
            Some(gw) => state.gateways.insert(iface.to_string(), gw),
            None => state.gateways.remove(iface),
        };
    }

    pub fn set_default_interface(&self, iface: Option<&str>) {
        self.state.lock().unwrap().default_interface = iface.map(str::to_string);
    }

    pub fn fail_routes(&self, fail: bool) {
        self.state.lock().unwrap().fail_routes = fail;
    }

    /// Make every internet probe take `delay` (virtual time under a paused clock)
    pub fn set_probe_delay(&self, delay: Duration) {
        self.state.lock().unwrap().probe_delay = Some(delay);
    }

    /// Every successful `replace_default_route` call, in order
    pub fn route_calls(&self) -> Vec<(String, IpAddr)> {
        self.state.lock().unwrap().route_calls.clone()
    }

    pub fn internet_probes(&self) -> usize {
        self.state.lock().unwrap().internet_probes
    }

    pub fn default_interface(&self) -> Option<String> {
        self.state.lock().unwrap().default_interface.clone()
    }
}

#[async_trait::async_trait]
impl Probe for SimulatedNetwork {
    async fn probe_internet(&self, link: &Link) -> bool {
        let (up, delay) = {
            let mut state = self.state.lock().unwrap();
            state.internet_probes += 1;
            (
                state.internet.get(link.interface()).copied().unwrap_or(false),
                state.probe_delay,
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        up
    }

    async fn probe_gateway(&self, link: &Link) -> bool {
        link.gateway().is_some()
            && self
                .state
                .lock()
                .unwrap()
                .gateway_answers
                .get(link.interface())
                .copied()
                .unwrap_or(false)
    }

    fn probe_name(&self) -> &'static str {
        "simulated"
    }
}

#[async_trait::async_trait]
impl GatewayResolver for SimulatedNetwork {
    async fn resolve_gateway(&self, interface: &str) -> Option<IpAddr> {
        self.state.lock().unwrap().gateways.get(interface).copied()
    }

    fn resolver_name(&self) -> &'static str {
        "simulated"
    }
}

#[async_trait::async_trait]
impl RouteController for SimulatedNetwork {
    async fn replace_default_route(&self, interface: &str, gateway: IpAddr) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_routes {
            return Err(Error::route_switch("RTNETLINK answers: Network is unreachable"));
        }
        state.route_calls.push((interface.to_string(), gateway));
        state.default_interface = Some(interface.to_string());
        Ok(())
    }

    async fn current_default_interface(&self) -> Option<String> {
        self.state.lock().unwrap().default_interface.clone()
    }
}

/// Valid config with thresholds 3/5, 3s interval and 30s dwell time
pub fn test_config() -> FailoverConfig {
    let mut config = FailoverConfig::new();
    config.primary = LinkConfig::new("primary", PRIMARY_IF).with_display_name("Fiber");
    config.secondary = LinkConfig::new("secondary", SECONDARY_IF).with_display_name("LTE");
    config.api.api_key = "test-key".to_string();
    config
}

/// Build an engine wired entirely to `net`
pub async fn engine_on(net: &SimulatedNetwork) -> FailoverEngine {
    engine_with(net, &test_config()).await
}

pub async fn engine_with(net: &SimulatedNetwork, config: &FailoverConfig) -> FailoverEngine {
    FailoverEngine::new(
        Box::new(net.clone()),
        Box::new(net.clone()),
        Box::new(net.clone()),
        config,
    )
    .await
    .expect("engine construction succeeds")
}

/// Run `n` evaluation cycles back to back
pub async fn run_cycles(engine: &FailoverEngine, n: usize) {
    for _ in 0..n {
        engine.evaluate_cycle().await;
    }
}
