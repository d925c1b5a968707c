//! ICMP reachability probe

use crate::command::{self, IP_BIN, PING_BIN};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;
use wanfo_core::traits::Probe;
use wanfo_core::{FailoverConfig, Link};

/// Slack added on top of ping's own `-W` wait before the process is killed
const PING_GRACE: Duration = Duration::from_secs(2);

/// Bound for the pin/unpin host route commands
const PIN_ROUTE_TIMEOUT: Duration = Duration::from_secs(1);

/// `Probe` backed by the system `ping` binary
///
/// An internet probe tries each target in order and stops at the first
/// reply. While a target is pinged, a host route `<target> via <gateway>
/// dev <iface>` is installed so the echo leaves through the probed link
/// even when the default route points elsewhere. The pin is removed
/// afterwards regardless of the outcome.
#[derive(Debug, Clone)]
pub struct PingProbe {
    targets: Vec<IpAddr>,
    timeout: Duration,
    count: u32,
    ping_bin: String,
    ip_bin: String,
}

impl PingProbe {
    pub fn new(targets: Vec<IpAddr>, timeout: Duration, count: u32) -> Self {
        Self {
            targets,
            timeout,
            count: count.max(1),
            ping_bin: PING_BIN.to_string(),
            ip_bin: IP_BIN.to_string(),
        }
    }

    /// Probe using the targets, timeout and count from `config`
    pub fn from_config(config: &FailoverConfig) -> Self {
        Self::new(
            config.ping_targets.clone(),
            config.ping_timeout(),
            config.ping_count,
        )
    }

    /// Use different `ping` / `ip` executables
    pub fn with_binaries(mut self, ping_bin: impl Into<String>, ip_bin: impl Into<String>) -> Self {
        self.ping_bin = ping_bin.into();
        self.ip_bin = ip_bin.into();
        self
    }

    /// ping's `-W` takes whole seconds; never pass 0 (wait forever on some builds)
    fn wait_secs(&self) -> u64 {
        self.timeout.as_secs_f64().ceil().max(1.0) as u64
    }

    async fn ping(
        &self,
        target: IpAddr,
        interface: &str,
        count: u32,
        pin_via: Option<IpAddr>,
    ) -> bool {
        let target_str = target.to_string();

        let pinned = match pin_via {
            Some(gateway) => self.pin_route(&target_str, &gateway.to_string(), interface).await,
            None => None,
        };

        let count_str = count.to_string();
        let wait_str = self.wait_secs().to_string();
        let args = [
            "-c",
            count_str.as_str(),
            "-W",
            wait_str.as_str(),
            "-I",
            interface,
            target_str.as_str(),
        ];

        let reachable = match command::run(&self.ping_bin, &args, self.timeout + PING_GRACE).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("ping {} via {} failed: {}", target, interface, e);
                false
            }
        };

        if let Some(gateway) = pinned {
            let args = [
                "route",
                "del",
                target_str.as_str(),
                "via",
                gateway.as_str(),
                "dev",
                interface,
            ];
            if let Err(e) = command::run(&self.ip_bin, &args, PIN_ROUTE_TIMEOUT).await {
                debug!("Failed to remove pinned route to {}: {}", target, e);
            }
        }

        reachable
    }

    /// Install the host route; returns the gateway string if it was attempted
    async fn pin_route(&self, target: &str, gateway: &str, interface: &str) -> Option<String> {
        let args = ["route", "replace", target, "via", gateway, "dev", interface];
        match command::run(&self.ip_bin, &args, PIN_ROUTE_TIMEOUT).await {
            Ok(_) => Some(gateway.to_string()),
            Err(e) => {
                // Probe anyway; the echo may still leave through the right link
                debug!("Failed to pin route to {} via {}: {}", target, gateway, e);
                None
            }
        }
    }
}

#[async_trait]
impl Probe for PingProbe {
    async fn probe_internet(&self, link: &Link) -> bool {
        for target in &self.targets {
            if self
                .ping(*target, link.interface(), self.count, link.gateway())
                .await
            {
                return true;
            }
        }
        false
    }

    async fn probe_gateway(&self, link: &Link) -> bool {
        match link.gateway() {
            Some(gateway) => self.ping(gateway, link.interface(), 1, None).await,
            None => false,
        }
    }

    fn probe_name(&self) -> &'static str {
        "ping"
    }
}
