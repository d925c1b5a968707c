//! Configuration types for the failover system
//!
//! This module defines all configuration structures used throughout the crate.
//! Loading them from disk is the daemon's job; the core only deserializes
//! and validates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder API key shipped in the example configuration
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_TO_A_RANDOM_STRING";

/// Main failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Preferred uplink
    #[serde(default = "default_primary")]
    pub primary: LinkConfig,

    /// Standby uplink
    #[serde(default = "default_secondary")]
    pub secondary: LinkConfig,

    /// Internet probe targets; a link is reachable if any one answers
    #[serde(default = "default_ping_targets")]
    pub ping_targets: Vec<IpAddr>,

    /// Per-probe timeout (in seconds)
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: f64,

    /// Echo requests sent per target
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    /// Delay between evaluation cycles (in seconds)
    #[serde(default = "default_check_interval")]
    pub check_interval: f64,

    /// Consecutive failures before a link is declared down
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Consecutive successes on the preferred link before switching back
    #[serde(default = "default_recovery_threshold")]
    pub recovery_threshold: u32,

    /// Minimum time on the standby link before switching back (in seconds)
    #[serde(default = "default_min_secondary_time")]
    pub min_secondary_time: f64,

    /// Directory holding `<interface>.json` gateway records
    #[serde(default = "default_gateway_state_dir")]
    pub gateway_state_dir: PathBuf,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log file written alongside stdout; `null` logs to stdout only
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
}

impl FailoverConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            ping_targets: default_ping_targets(),
            ping_timeout: default_ping_timeout(),
            ping_count: default_ping_count(),
            check_interval: default_check_interval(),
            failure_threshold: default_failure_threshold(),
            recovery_threshold: default_recovery_threshold(),
            min_secondary_time: default_min_secondary_time(),
            gateway_state_dir: default_gateway_state_dir(),
            api: ApiConfig::default(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.primary.validate("primary")?;
        self.secondary.validate("secondary")?;

        if self.primary.name == self.secondary.name {
            return Err(crate::Error::config(format!(
                "Link names must differ (both are '{}')",
                self.primary.name
            )));
        }
        if self.primary.interface == self.secondary.interface {
            return Err(crate::Error::config(format!(
                "Link interfaces must differ (both are '{}')",
                self.primary.interface
            )));
        }

        if self.ping_targets.is_empty() {
            return Err(crate::Error::config("ping_targets cannot be empty"));
        }
        let unique: HashSet<_> = self.ping_targets.iter().collect();
        if unique.len() != self.ping_targets.len() {
            return Err(crate::Error::config("ping_targets contains duplicates"));
        }
        if self.ping_count == 0 {
            return Err(crate::Error::config("ping_count must be > 0"));
        }

        positive_secs("ping_timeout", self.ping_timeout)?;
        positive_secs("check_interval", self.check_interval)?;
        if Duration::try_from_secs_f64(self.min_secondary_time).is_err() {
            return Err(crate::Error::config(
                "min_secondary_time must be >= 0 and representable as a duration",
            ));
        }

        if self.failure_threshold == 0 {
            return Err(crate::Error::config("failure_threshold must be > 0"));
        }
        if self.recovery_threshold == 0 {
            return Err(crate::Error::config("recovery_threshold must be > 0"));
        }

        self.api.validate()?;

        if let Some(path) = &self.log_file {
            if path.file_name().is_none() {
                return Err(crate::Error::config(format!(
                    "log_file '{}' must name a file",
                    path.display()
                )));
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(crate::Error::config(format!(
                "log_level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ))),
        }
    }

    /// Per-probe timeout
    pub fn ping_timeout(&self) -> Duration {
        secs_or(self.ping_timeout, default_ping_timeout())
    }

    /// Delay between evaluation cycles
    pub fn check_interval(&self) -> Duration {
        secs_or(self.check_interval, default_check_interval())
    }

    /// Minimum dwell time on the standby link
    pub fn min_secondary_time(&self) -> Duration {
        secs_or(self.min_secondary_time, default_min_secondary_time())
    }
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn positive_secs(field: &str, value: f64) -> Result<(), crate::Error> {
    match Duration::try_from_secs_f64(value) {
        Ok(d) if !d.is_zero() => Ok(()),
        Ok(_) => Err(crate::Error::config(format!("{} must be > 0 seconds", field))),
        Err(_) => Err(crate::Error::config(format!(
            "{} = {} is not a valid number of seconds",
            field, value
        ))),
    }
}

/// Seconds to a Duration; values `validate()` rejects fall back to `default`
fn secs_or(value: f64, default: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_else(|_| Duration::from_secs_f64(default))
}

/// A single WAN uplink descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Stable identifier used by the API (e.g. "primary")
    pub name: String,

    /// Network interface carrying this uplink (e.g. "eth0")
    pub interface: String,

    /// Friendly label shown in status output (e.g. the ISP name)
    #[serde(default)]
    pub display_name: Option<String>,

    /// Lower is preferred; defaults to the slot order when omitted
    #[serde(default)]
    pub priority: Option<u32>,
}

impl LinkConfig {
    /// Create a new link descriptor
    pub fn new(name: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: interface.into(),
            display_name: None,
            priority: None,
        }
    }

    /// Set the display label
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set an explicit priority
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    fn validate(&self, slot: &str) -> Result<(), crate::Error> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::config(format!("{} link name cannot be empty", slot)));
        }
        if self.interface.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "{} link interface cannot be empty",
                slot
            )));
        }
        Ok(())
    }
}

/// REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    #[serde(default = "default_api_host")]
    pub host: IpAddr,

    /// Bind port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Shared secret; sent as a bearer token or `api_key` query parameter
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("api.api_key cannot be empty"));
        }
        if self.api_key == PLACEHOLDER_API_KEY {
            return Err(crate::Error::config(
                "api.api_key is still the placeholder. Set a random secret.",
            ));
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            api_key: default_api_key(),
        }
    }
}

fn default_primary() -> LinkConfig {
    LinkConfig::new("primary", "eth0")
}

fn default_secondary() -> LinkConfig {
    LinkConfig::new("secondary", "eth1")
}

fn default_ping_targets() -> Vec<IpAddr> {
    vec![
        IpAddr::from([8, 8, 8, 8]),
        IpAddr::from([1, 1, 1, 1]),
        IpAddr::from([9, 9, 9, 9]),
    ]
}

fn default_ping_timeout() -> f64 {
    1.5
}

fn default_ping_count() -> u32 {
    1
}

fn default_check_interval() -> f64 {
    3.0
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_recovery_threshold() -> u32 {
    5
}

fn default_min_secondary_time() -> f64 {
    30.0
}

fn default_gateway_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/wan-failover")
}

fn default_api_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_api_port() -> u16 {
    8780
}

fn default_api_key() -> String {
    PLACEHOLDER_API_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("/var/log/wan-failover.log"))
}
