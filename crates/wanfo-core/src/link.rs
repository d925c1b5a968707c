//! Per-link health record and state machine
//!
//! A [`Link`] flips `Up → Down` only once its consecutive-failure counter
//! reaches the configured threshold, and flips back `Down → Up` on the very
//! next successful probe. The failure and success counters are never both
//! non-zero.

use crate::config::LinkConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

/// Outcome of feeding one internet probe result into a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTransition {
    /// The `healthy` flag did not change
    Unchanged,
    /// The failure threshold was reached on this probe
    WentDown,
    /// The link was down and this probe succeeded
    Recovered,
}

/// Outcome of refreshing a link's gateway address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayChange {
    /// Same address as before (or still unknown)
    Unchanged,
    /// First address learned for this link
    Detected(IpAddr),
    /// A known address was replaced by a different one
    Changed { from: IpAddr, to: IpAddr },
    /// A known address could no longer be resolved
    Lost(IpAddr),
}

/// One monitored WAN uplink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    name: String,
    interface: String,
    display_name: Option<String>,
    priority: u32,
    gateway: Option<IpAddr>,
    healthy: bool,
    gateway_reachable: bool,
    last_check: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    consecutive_successes: u32,
}

impl Link {
    /// Build a link from its descriptor; `default_priority` applies when the
    /// descriptor does not set one.
    pub fn from_config(config: &LinkConfig, default_priority: u32) -> Self {
        Self {
            name: config.name.clone(),
            interface: config.interface.clone(),
            display_name: config.display_name.clone(),
            priority: config.priority.unwrap_or(default_priority),
            gateway: None,
            healthy: true,
            gateway_reachable: true,
            last_check: None,
            consecutive_failures: 0,
            consecutive_successes: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Display name if set, otherwise the link name
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn gateway(&self) -> Option<IpAddr> {
        self.gateway
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn gateway_reachable(&self) -> bool {
        self.gateway_reachable
    }

    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        self.last_check
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    /// Record one internet probe result
    pub(crate) fn record_probe(
        &mut self,
        reachable: bool,
        failure_threshold: u32,
        at: DateTime<Utc>,
    ) -> HealthTransition {
        self.last_check = Some(at);

        if reachable {
            self.consecutive_failures = 0;
            self.consecutive_successes = self.consecutive_successes.saturating_add(1);
            if !self.healthy {
                self.healthy = true;
                return HealthTransition::Recovered;
            }
        } else {
            self.consecutive_successes = 0;
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.healthy && self.consecutive_failures >= failure_threshold {
                self.healthy = false;
                return HealthTransition::WentDown;
            }
        }

        HealthTransition::Unchanged
    }

    /// Record a gateway probe result; returns `true` if reachability flipped
    pub(crate) fn record_gateway_probe(&mut self, reachable: bool) -> bool {
        let changed = self.gateway_reachable != reachable;
        self.gateway_reachable = reachable;
        changed
    }

    /// Apply a freshly resolved gateway address
    pub(crate) fn update_gateway(&mut self, resolved: Option<IpAddr>) -> GatewayChange {
        let change = match (self.gateway, resolved) {
            (None, Some(to)) => GatewayChange::Detected(to),
            (Some(from), Some(to)) if from != to => GatewayChange::Changed { from, to },
            (Some(from), None) => GatewayChange::Lost(from),
            _ => GatewayChange::Unchanged,
        };
        self.gateway = resolved;
        change
    }

    pub(crate) fn status(&self) -> LinkStatus {
        LinkStatus {
            name: self.name.clone(),
            display_name: self.label().to_string(),
            interface: self.interface.clone(),
            priority: self.priority,
            gateway: self.gateway,
            healthy: self.healthy,
            gateway_reachable: self.gateway_reachable,
            consecutive_failures: self.consecutive_failures,
            consecutive_successes: self.consecutive_successes,
            last_check: self.last_check,
        }
    }
}

/// Point-in-time copy of a link's diagnostic fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub name: String,
    pub display_name: String,
    pub interface: String,
    pub priority: u32,
    pub gateway: Option<IpAddr>,
    pub healthy: bool,
    pub gateway_reachable: bool,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub last_check: Option<DateTime<Utc>>,
}
