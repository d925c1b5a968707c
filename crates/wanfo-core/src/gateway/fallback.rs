// # Fallback Resolver
//
// Tries a list of resolvers in order and returns the first address found.
// The daemon uses it to prefer the DHCP hook's state file over parsing the
// routing table.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::traits::GatewayResolver;

/// Ordered chain of gateway resolvers
pub struct FallbackResolver {
    resolvers: Vec<Box<dyn GatewayResolver>>,
}

impl FallbackResolver {
    /// Create an empty chain (resolves nothing)
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Append a resolver; earlier resolvers win
    pub fn with(mut self, resolver: Box<dyn GatewayResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Number of resolvers in the chain
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl Default for FallbackResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayResolver for FallbackResolver {
    async fn resolve_gateway(&self, interface: &str) -> Option<IpAddr> {
        for resolver in &self.resolvers {
            if let Some(gateway) = resolver.resolve_gateway(interface).await {
                tracing::trace!(
                    "{} resolved gateway {} for {}",
                    resolver.resolver_name(),
                    gateway,
                    interface
                );
                return Some(gateway);
            }
        }
        None
    }

    fn resolver_name(&self) -> &'static str {
        "fallback"
    }
}
