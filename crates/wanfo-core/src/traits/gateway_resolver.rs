// # Gateway Resolver Trait
//
// Defines the interface for discovering the next-hop address of a link.
//
// ## Implementations
//
// - State file written by a DHCP client hook: [`crate::gateway::StateFileResolver`]
// - Routing table parsing: `wanfo-iproute` crate
// - Ordered chain of the above: [`crate::gateway::FallbackResolver`]

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for gateway discovery implementations
///
/// Resolution is best-effort. `None` means "unknown right now" and is a
/// perfectly valid answer: the engine keeps probing and will refuse to
/// switch to a link without a gateway, but it never treats an unresolved
/// gateway as an unhealthy link.
#[async_trait]
pub trait GatewayResolver: Send + Sync {
    /// Resolve the current gateway for `interface`
    ///
    /// # Returns
    ///
    /// - `Some(IpAddr)`: The gateway currently known for the interface
    /// - `None`: No gateway could be determined
    async fn resolve_gateway(&self, interface: &str) -> Option<IpAddr>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str {
        "resolver"
    }
}
