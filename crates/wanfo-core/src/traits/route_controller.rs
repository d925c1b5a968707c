// # Route Controller Trait
//
// Defines the interface for changing which link carries the default route.
//
// ## Implementations
//
// - iproute2 (`ip route replace default ...`): `wanfo-iproute` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for default-route manipulation
///
/// # Forbidden Capabilities
/// - ❌ Retrying a failed replacement (the next cycle or API call retries)
/// - ❌ Deciding which link should be active (owned by `FailoverEngine`)
/// - ❌ Blocking without a bound (the engine lock is held during the call)
#[async_trait]
pub trait RouteController: Send + Sync {
    /// Make `gateway` via `interface` the default route
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The kernel default route now points at the link
    /// - `Err(Error)`: The replacement failed; the previous route is assumed intact
    async fn replace_default_route(
        &self,
        interface: &str,
        gateway: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Get the interface currently holding the default route
    ///
    /// Used once at startup to infer which link is active.
    async fn current_default_interface(&self) -> Option<String>;
}
