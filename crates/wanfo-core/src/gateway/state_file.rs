// # State File Resolver
//
// Reads gateway addresses persisted by the DHCP client exit hook.
//
// ## File Format
//
// One file per interface, `<state_dir>/<interface>.json`:
//
// ```json
// {
//   "gateway": "192.168.1.1",
//   "interface": "eth0",
//   "reason": "BOUND"
// }
// ```
//
// Only `gateway` is read; any other fields are ignored. The daemon does not
// own these files and never writes them.

use async_trait::async_trait;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::traits::GatewayResolver;

/// Subset of the hook's record the resolver cares about
#[derive(Debug, serde::Deserialize)]
struct GatewayRecord {
    gateway: Option<String>,
}

/// Gateway resolver backed by per-interface JSON files
///
/// Missing files, unreadable files, malformed JSON, a missing `gateway`
/// field and unparsable addresses all resolve to `None`.
///
/// # Example
///
/// ```rust,no_run
/// use wanfo_core::gateway::StateFileResolver;
/// use wanfo_core::traits::GatewayResolver;
///
/// #[tokio::main]
/// async fn main() {
///     let resolver = StateFileResolver::new("/var/lib/wan-failover");
///     let gateway = resolver.resolve_gateway("eth0").await;
///     println!("eth0 gateway: {:?}", gateway);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StateFileResolver {
    dir: PathBuf,
}

impl StateFileResolver {
    /// Create a resolver reading from `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get path to the record for `interface`
    fn record_path(&self, interface: &str) -> PathBuf {
        self.dir.join(format!("{}.json", interface))
    }

    /// Load and parse the record for `interface`
    async fn load(&self, interface: &str) -> Result<Option<IpAddr>, crate::Error> {
        let path = self.record_path(interface);
        if !path.exists() {
            tracing::trace!("Gateway state file does not exist: {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let record: GatewayRecord = serde_json::from_str(&content)?;

        Ok(record.gateway.and_then(|raw| match raw.trim().parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::debug!("Ignoring unparsable gateway '{}' in {}", raw, path.display());
                None
            }
        }))
    }
}

#[async_trait]
impl GatewayResolver for StateFileResolver {
    async fn resolve_gateway(&self, interface: &str) -> Option<IpAddr> {
        match self.load(interface).await {
            Ok(gateway) => gateway,
            Err(e) => {
                tracing::debug!("Gateway state for {} unusable: {}", interface, e);
                None
            }
        }
    }

    fn resolver_name(&self) -> &'static str {
        "state-file"
    }
}
