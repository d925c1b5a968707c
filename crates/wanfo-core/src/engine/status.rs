//! Read-only views returned by the engine's command surface

use super::event_log::Event;
use crate::link::LinkStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

/// Consistent copy of the engine state, taken under the engine lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Name of the link holding the default route
    pub active_link: String,
    pub active_display_name: String,
    pub active_interface: String,
    pub active_gateway: Option<IpAddr>,
    pub auto_enabled: bool,
    pub primary: LinkStatus,
    pub secondary: LinkStatus,
    /// Successful switches since start
    pub switch_count: u64,
    /// Time of the last successful switch, if any
    pub last_switch: Option<DateTime<Utc>>,
    pub uptime_seconds: u64,
    /// Newest events, oldest first
    pub recent_events: Vec<Event>,
}

/// Successful result of a manual switch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualSwitch {
    /// The target already held the default route; nothing was done
    AlreadyActive { link: String, label: String },
    /// The default route moved
    Switched { from: String, to: String },
}

/// What one evaluation cycle decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Auto-mode is off; diagnostics were refreshed only
    AutoDisabled,
    /// Nothing to do
    Steady,
    /// The default route moved to the named link
    Switched { to: String },
    /// A switch was attempted and failed
    SwitchFailed { to: String },
    /// Neither link is usable; stayed on the active one
    BothDown,
}
