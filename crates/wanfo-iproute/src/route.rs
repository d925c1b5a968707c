//! Default-route control and routing-table gateway discovery

use crate::command::{self, IP_BIN};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};
use wanfo_core::traits::{GatewayResolver, RouteController};
use wanfo_core::{Error, Result};

/// Bound for every `ip route` invocation
const IP_ROUTE_TIMEOUT: Duration = Duration::from_secs(5);

/// `RouteController` backed by `ip route`
///
/// Uses `ip route replace default` so the kernel swaps the route in one
/// step. There is no window without a default route.
#[derive(Debug, Clone)]
pub struct IpRouteController {
    ip_bin: String,
}

impl IpRouteController {
    pub fn new() -> Self {
        Self {
            ip_bin: IP_BIN.to_string(),
        }
    }

    /// Use a different `ip` executable
    pub fn with_binary(mut self, ip_bin: impl Into<String>) -> Self {
        self.ip_bin = ip_bin.into();
        self
    }
}

impl Default for IpRouteController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteController for IpRouteController {
    async fn replace_default_route(&self, interface: &str, gateway: IpAddr) -> Result<()> {
        let gateway = gateway.to_string();
        let args = [
            "route",
            "replace",
            "default",
            "via",
            gateway.as_str(),
            "dev",
            interface,
        ];

        let output = command::run(&self.ip_bin, &args, IP_ROUTE_TIMEOUT)
            .await
            .map_err(|e| Error::route_switch(e.to_string()))?;

        if !output.status.success() {
            return Err(Error::route_switch(command::failure_reason(&output)));
        }
        Ok(())
    }

    async fn current_default_interface(&self) -> Option<String> {
        match command::run(&self.ip_bin, &["route", "show", "default"], IP_ROUTE_TIMEOUT).await {
            Ok(output) if output.status.success() => {
                parse_default_interface(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!(
                    "ip route show default failed: {}",
                    command::failure_reason(&output)
                );
                None
            }
            Err(e) => {
                warn!("ip route show default failed: {}", e);
                None
            }
        }
    }
}

/// `GatewayResolver` that reads the kernel routing table
///
/// Meant as the fallback behind the DHCP state files: it only finds a
/// gateway while some route via the interface exists.
#[derive(Debug, Clone)]
pub struct RouteTableResolver {
    ip_bin: String,
}

impl RouteTableResolver {
    pub fn new() -> Self {
        Self {
            ip_bin: IP_BIN.to_string(),
        }
    }

    /// Use a different `ip` executable
    pub fn with_binary(mut self, ip_bin: impl Into<String>) -> Self {
        self.ip_bin = ip_bin.into();
        self
    }
}

impl Default for RouteTableResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayResolver for RouteTableResolver {
    async fn resolve_gateway(&self, interface: &str) -> Option<IpAddr> {
        let args = ["route", "show", "dev", interface];
        match command::run(&self.ip_bin, &args, IP_ROUTE_TIMEOUT).await {
            Ok(output) if output.status.success() => {
                parse_interface_gateway(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(_) => None,
            Err(e) => {
                debug!("ip route show dev {} failed: {}", interface, e);
                None
            }
        }
    }

    fn resolver_name(&self) -> &'static str {
        "route-table"
    }
}

/// Word following `key` on a whitespace-split route line
fn field_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut words = line.split_whitespace();
    words.by_ref().find(|w| *w == key)?;
    words.next()
}

/// Extract the `dev` of the first `default` line of `ip route show default`
pub fn parse_default_interface(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("default"))
        .find_map(|line| field_after(line, "dev"))
        .map(str::to_string)
}

/// Extract a gateway from `ip route show dev <iface>` output
///
/// A `default via X` line wins; otherwise the first line with any `via X`.
/// Unparsable addresses are skipped.
pub fn parse_interface_gateway(output: &str) -> Option<IpAddr> {
    let via = |line: &str| field_after(line, "via").and_then(|w| w.parse::<IpAddr>().ok());
    let lines = || output.lines().map(str::trim).filter(|l| !l.is_empty());

    lines()
        .filter(|line| line.starts_with("default"))
        .find_map(via)
        .or_else(|| lines().find_map(via))
}
