// # Probe Trait
//
// Defines the interface for checking whether a link can reach the internet
// and whether its gateway answers.
//
// ## Implementations
//
// - ICMP via the system `ping` binary: `wanfo-iproute` crate
//
// ## Usage
//
// ```rust,ignore
// use wanfo_core::Probe;
//
// let healthy = probe.probe_internet(&link).await;
// let gateway_ok = probe.probe_gateway(&link).await;
// ```

use crate::link::Link;
use async_trait::async_trait;

/// Trait for reachability probe implementations
///
/// Probes are pure queries: they read the link's interface and gateway and
/// report a boolean. They own no state and never decide anything.
///
/// # Timeouts
///
/// The engine holds its lock while a probe runs, so every implementation
/// MUST bound its own running time. A hung probe delays API commands; an
/// unbounded one would stall them forever.
///
/// # Errors
///
/// There is no error channel. Transport errors, timeouts and missing
/// binaries are all reported as `false`: to the engine an unreachable
/// target and a broken probe look the same, and the failure threshold
/// absorbs both.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Check internet reachability through the link's interface
    ///
    /// # Returns
    ///
    /// `true` if any configured target answered within the timeout
    async fn probe_internet(&self, link: &Link) -> bool;

    /// Check whether the link's gateway answers a single probe
    ///
    /// # Returns
    ///
    /// `false` if the gateway is unknown or did not answer in time
    async fn probe_gateway(&self, link: &Link) -> bool;

    /// Get the probe name (for logging/debugging)
    fn probe_name(&self) -> &'static str {
        "probe"
    }
}
