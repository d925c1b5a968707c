//! Core failover engine
//!
//! The FailoverEngine is responsible for:
//! - Refreshing each link's gateway via GatewayResolver
//! - Probing both links and driving their Up/Down state machines
//! - Deciding when to move the default route, and doing it via RouteController
//! - Serving manual commands and status snapshots
//!
//! ## Architecture
//!
//! ```text
//!   scheduler (run loop)              API requests
//!          │                               │
//!          │ evaluate_cycle()              │ manual_switch() / set_auto_mode() / status()
//!          └───────────────┬───────────────┘
//!                          ▼
//!              ┌───────────────────────┐
//!              │ Mutex<EngineState>    │
//!              └───────────────────────┘
//!                          │
//!         ┌────────────────┼────────────────┐
//!         ▼                ▼                ▼
//! ┌───────────────┐ ┌─────────────┐ ┌─────────────────┐
//! │GatewayResolver│ │    Probe    │ │ RouteController │
//! └───────────────┘ └─────────────┘ └─────────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Refresh gateways (DHCP may have changed them)
//! 2. Probe both links, update counters and health
//! 3. If auto-mode is off, stop here
//! 4. Active link down: move to the other link if it is up
//! 5. On the non-preferred link: move back once the preferred link is
//!    stable for `recovery_threshold` probes AND `min_secondary_time` passed

pub mod event_log;
pub mod status;

pub use event_log::{EVENT_LOG_CAPACITY, Event, EventKind, EventLog, RECENT_EVENTS};
pub use status::{CycleOutcome, ManualSwitch, StatusSnapshot};

use crate::config::FailoverConfig;
use crate::error::{Error, Result};
use crate::link::{GatewayChange, HealthTransition, Link};
use crate::traits::{GatewayResolver, Probe, RouteController};
use chrono::{DateTime, Utc};
use std::future::Future;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Which of the two owned links a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkSlot {
    Primary,
    Secondary,
}

impl LinkSlot {
    const ALL: [LinkSlot; 2] = [LinkSlot::Primary, LinkSlot::Secondary];

    fn index(self) -> usize {
        match self {
            LinkSlot::Primary => 0,
            LinkSlot::Secondary => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            LinkSlot::Primary => LinkSlot::Secondary,
            LinkSlot::Secondary => LinkSlot::Primary,
        }
    }
}

/// When the last successful switch happened
#[derive(Debug, Clone, Copy)]
struct SwitchStamp {
    /// Monotonic, drives the switch-back timer
    at: Instant,
    /// Wall clock, for reporting
    wall: DateTime<Utc>,
}

/// Everything guarded by the engine lock
struct EngineState {
    links: [Link; 2],
    active: LinkSlot,
    auto_enabled: bool,
    last_switch: Option<SwitchStamp>,
    switch_count: u64,
    events: EventLog,
}

impl EngineState {
    fn link(&self, slot: LinkSlot) -> &Link {
        &self.links[slot.index()]
    }

    fn link_mut(&mut self, slot: LinkSlot) -> &mut Link {
        &mut self.links[slot.index()]
    }

    /// Lowest priority value wins; ties go to the primary slot
    fn preferred(&self) -> LinkSlot {
        if self.link(LinkSlot::Secondary).priority() < self.link(LinkSlot::Primary).priority() {
            LinkSlot::Secondary
        } else {
            LinkSlot::Primary
        }
    }

    fn slot_by_name(&self, name: &str) -> Option<LinkSlot> {
        LinkSlot::ALL
            .into_iter()
            .find(|slot| self.link(*slot).name() == name)
    }
}

/// Thresholds and timings copied out of the config
#[derive(Debug, Clone, Copy)]
struct Policy {
    failure_threshold: u32,
    recovery_threshold: u32,
    min_secondary_time: Duration,
    check_interval: Duration,
}

/// Core failover engine
///
/// The engine owns both link records and the decision state. All entry
/// points take `&self` and serialize on a single async mutex, so the engine
/// is shared between the scheduler and the API server behind an `Arc`.
///
/// ## Lifecycle
///
/// 1. Create with [`FailoverEngine::new()`] (resolves gateways, detects
///    the active link from the current default route)
/// 2. Start the scheduler with [`FailoverEngine::run_until()`]
/// 3. Issue commands concurrently from other tasks
///
/// ## Locking
///
/// The lock is held across collaborator calls. Each collaborator bounds
/// its own running time, so a hung probe delays commands but never
/// blocks them indefinitely.
pub struct FailoverEngine {
    probe: Box<dyn Probe>,
    resolver: Box<dyn GatewayResolver>,
    routes: Box<dyn RouteController>,
    policy: Policy,
    started_at: Instant,
    state: Mutex<EngineState>,
}

impl FailoverEngine {
    /// Create a new failover engine
    ///
    /// # Parameters
    ///
    /// - `probe`: Reachability probe implementation
    /// - `resolver`: Gateway discovery implementation
    /// - `routes`: Default-route controller implementation
    /// - `config`: Failover configuration (validated here)
    pub async fn new(
        probe: Box<dyn Probe>,
        resolver: Box<dyn GatewayResolver>,
        routes: Box<dyn RouteController>,
        config: &FailoverConfig,
    ) -> Result<Self> {
        config.validate()?;

        let links = [
            Link::from_config(&config.primary, 1),
            Link::from_config(&config.secondary, 2),
        ];

        let engine = Self {
            probe,
            resolver,
            routes,
            policy: Policy {
                failure_threshold: config.failure_threshold,
                recovery_threshold: config.recovery_threshold,
                min_secondary_time: config.min_secondary_time(),
                check_interval: config.check_interval(),
            },
            started_at: Instant::now(),
            state: Mutex::new(EngineState {
                links,
                active: LinkSlot::Primary,
                auto_enabled: true,
                last_switch: None,
                switch_count: 0,
                events: EventLog::new(),
            }),
        };

        {
            let mut state = engine.state.lock().await;
            engine.refresh_gateways(&mut state).await;
            engine.detect_active_link(&mut state).await;
        }

        Ok(engine)
    }

    /// Run the scheduler until `shutdown` resolves
    ///
    /// One cycle runs to completion, then the loop waits `check_interval`
    /// or the shutdown signal, whichever comes first. Shutdown is only
    /// observed between cycles; an in-flight cycle is never cut short.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.announce_start().await;

        loop {
            let outcome = self.evaluate_cycle().await;
            debug!("Cycle finished: {:?}", outcome);

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }

                _ = tokio::time::sleep(self.policy.check_interval) => {}
            }
        }

        info!("Daemon stopping");
        self.state
            .lock()
            .await
            .events
            .push(EventKind::Stop, "Daemon stopped");
        Ok(())
    }

    /// Run the scheduler until `shutdown_rx` fires (or its sender is dropped)
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Result<()> {
        self.run_until(async {
            let _ = shutdown_rx.await;
        })
        .await
    }

    /// Run a single evaluation cycle
    pub async fn evaluate_cycle(&self) -> CycleOutcome {
        let mut state = self.state.lock().await;

        self.refresh_gateways(&mut state).await;
        for slot in LinkSlot::ALL {
            self.check_link(&mut state, slot).await;
        }

        if !state.auto_enabled {
            return CycleOutcome::AutoDisabled;
        }

        let active = state.active;
        let other = active.other();

        // Case 1: active link is down
        if !state.link(active).is_healthy() {
            if state.link(other).is_healthy() {
                let reason = format!(
                    "{} is down, {} is healthy",
                    state.link(active).label(),
                    state.link(other).label()
                );
                return self.switch_outcome(&mut state, other, &reason).await;
            }

            error!("Both links appear to be down!");
            state.events.push(EventKind::Error, "Both links are down");
            return CycleOutcome::BothDown;
        }

        // Case 2: on the non-preferred link, preferred may be back
        let preferred = state.preferred();
        if active != preferred
            && state.link(preferred).is_healthy()
            && self.switch_back_allowed(&state, preferred)
        {
            let reason = format!("{} recovered and stable", state.link(preferred).label());
            return self.switch_outcome(&mut state, preferred, &reason).await;
        }

        CycleOutcome::Steady
    }

    /// Switch the default route to the link named `target`
    ///
    /// Bypasses health thresholds and auto-mode. Switching to the link that
    /// is already active succeeds without touching anything.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownLink`]: `target` is not a configured link name
    /// - [`Error::NoGateway`]: the target's gateway is unknown
    /// - any error from the route controller
    pub async fn manual_switch(&self, target: &str) -> Result<ManualSwitch> {
        let mut state = self.state.lock().await;

        let slot = state
            .slot_by_name(target)
            .ok_or_else(|| Error::unknown_link(target))?;

        if slot == state.active {
            let link = state.link(slot);
            return Ok(ManualSwitch::AlreadyActive {
                link: link.name().to_string(),
                label: link.label().to_string(),
            });
        }

        let from = state.link(state.active).name().to_string();
        self.execute_switch(&mut state, slot, "manual switch via API")
            .await?;

        Ok(ManualSwitch::Switched {
            from,
            to: state.link(slot).name().to_string(),
        })
    }

    /// Enable or disable automatic switching
    pub async fn set_auto_mode(&self, enabled: bool) {
        let mut state = self.state.lock().await;
        state.auto_enabled = enabled;

        let word = if enabled { "enabled" } else { "disabled" };
        info!("Auto-failover {}", word);
        state
            .events
            .push(EventKind::Config, format!("Auto-failover {}", word));
    }

    /// Take a consistent snapshot of the engine state
    pub async fn status(&self) -> StatusSnapshot {
        let state = self.state.lock().await;
        let active = state.link(state.active);

        StatusSnapshot {
            active_link: active.name().to_string(),
            active_display_name: active.label().to_string(),
            active_interface: active.interface().to_string(),
            active_gateway: active.gateway(),
            auto_enabled: state.auto_enabled,
            primary: state.link(LinkSlot::Primary).status(),
            secondary: state.link(LinkSlot::Secondary).status(),
            switch_count: state.switch_count,
            last_switch: state.last_switch.map(|s| s.wall),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            recent_events: state.events.recent(RECENT_EVENTS),
        }
    }

    /// Copy of the whole event log, oldest first
    pub async fn events(&self) -> Vec<Event> {
        self.state.lock().await.events.recent(EVENT_LOG_CAPACITY)
    }

    async fn announce_start(&self) {
        let mut state = self.state.lock().await;
        let describe = |link: &Link| {
            format!(
                "{} ({}, gw={})",
                link.label(),
                link.interface(),
                link.gateway()
                    .map(|gw| gw.to_string())
                    .unwrap_or_else(|| "detecting...".to_string())
            )
        };

        info!(
            "WAN Failover started | Primary: {} | Secondary: {} | Check interval: {:?}",
            describe(state.link(LinkSlot::Primary)),
            describe(state.link(LinkSlot::Secondary)),
            self.policy.check_interval
        );
        state.events.push(EventKind::Start, "Daemon started");
    }

    /// Discover/refresh gateway addresses for both links
    async fn refresh_gateways(&self, state: &mut EngineState) {
        for slot in LinkSlot::ALL {
            let resolved = self
                .resolver
                .resolve_gateway(state.link(slot).interface())
                .await;

            let link = state.link_mut(slot);
            let label = link.label().to_string();
            let interface = link.interface().to_string();

            match link.update_gateway(resolved) {
                GatewayChange::Unchanged => {}
                GatewayChange::Detected(gateway) => {
                    info!("Detected gateway for {}: {} (via {})", label, gateway, interface);
                }
                GatewayChange::Changed { from, to } => {
                    info!("Gateway changed for {}: {} -> {}", label, from, to);
                    state.events.push(
                        EventKind::GatewayChange,
                        format!("{} gateway: {} -> {}", label, from, to),
                    );
                }
                GatewayChange::Lost(previous) => {
                    warn!("Lost gateway for {} ({}, was {})", label, interface, previous);
                }
            }
        }
    }

    /// Pick the active link from whichever interface holds the default route
    async fn detect_active_link(&self, state: &mut EngineState) {
        let current = self.routes.current_default_interface().await;

        let slot = current
            .as_deref()
            .and_then(|dev| {
                LinkSlot::ALL
                    .into_iter()
                    .find(|slot| state.link(*slot).interface() == dev)
            })
            .unwrap_or_else(|| state.preferred());

        state.active = slot;
        info!(
            "Detected active link: {} ({})",
            state.link(slot).label(),
            current.as_deref().unwrap_or("no default route")
        );
    }

    /// Probe one link (gateway + internet) and apply the results
    async fn check_link(&self, state: &mut EngineState, slot: LinkSlot) {
        // Gateway probe is diagnostic only; it never drives failover
        let gateway_ok = self.probe.probe_gateway(state.link(slot)).await;
        let reachable = self.probe.probe_internet(state.link(slot)).await;

        let threshold = self.policy.failure_threshold;
        let link = state.link_mut(slot);
        let label = link.label().to_string();

        if link.record_gateway_probe(gateway_ok) {
            let gateway = link
                .gateway()
                .map(|gw| gw.to_string())
                .unwrap_or_else(|| "?".to_string());
            if gateway_ok {
                info!("{} gateway {} reachable", label, gateway);
            } else {
                warn!("{} gateway {} unreachable", label, gateway);
            }
        }

        match link.record_probe(reachable, threshold, Utc::now()) {
            HealthTransition::Unchanged => {}
            HealthTransition::WentDown => {
                warn!(
                    "{} declared DOWN after {} failures",
                    label,
                    link.consecutive_failures()
                );
                state
                    .events
                    .push(EventKind::Down, format!("{} is down", label));
            }
            HealthTransition::Recovered => {
                info!("{} recovered (internet reachable)", label);
                state
                    .events
                    .push(EventKind::Recovery, format!("{} is back online", label));
            }
        }
    }

    /// Both switch-back conditions: dwell time and sustained success
    fn switch_back_allowed(&self, state: &EngineState, preferred: LinkSlot) -> bool {
        let dwell_ok = state
            .last_switch
            .is_none_or(|s| s.at.elapsed() >= self.policy.min_secondary_time);
        let successes = state.link(preferred).consecutive_successes();
        let stable = successes >= self.policy.recovery_threshold;

        if !(dwell_ok && stable) {
            debug!(
                "Holding on {}: dwell_ok={} successes={}/{}",
                state.link(state.active).label(),
                dwell_ok,
                successes,
                self.policy.recovery_threshold
            );
        }

        dwell_ok && stable
    }

    async fn switch_outcome(
        &self,
        state: &mut EngineState,
        target: LinkSlot,
        reason: &str,
    ) -> CycleOutcome {
        let to = state.link(target).name().to_string();
        match self.execute_switch(state, target, reason).await {
            Ok(()) => CycleOutcome::Switched { to },
            Err(_) => CycleOutcome::SwitchFailed { to },
        }
    }

    /// Perform the actual switch. Caller must hold the lock.
    ///
    /// On failure the state is left untouched apart from an `error` event.
    async fn execute_switch(
        &self,
        state: &mut EngineState,
        target: LinkSlot,
        reason: &str,
    ) -> Result<()> {
        let old_label = state.link(state.active).label().to_string();
        let link = state.link(target);
        let label = link.label().to_string();
        let interface = link.interface().to_string();

        let result = match link.gateway() {
            Some(gateway) => self
                .routes
                .replace_default_route(&interface, gateway)
                .await
                .map(|()| gateway),
            None => Err(Error::no_gateway(&label, &interface)),
        };

        match result {
            Ok(gateway) => {
                info!(
                    "Default route switched to {} ({} via {})",
                    label, gateway, interface
                );
                state.active = target;
                state.last_switch = Some(SwitchStamp {
                    at: Instant::now(),
                    wall: Utc::now(),
                });
                state.switch_count += 1;

                let msg = format!("Switched {} -> {}: {}", old_label, label, reason);
                warn!("{}", msg);
                state.events.push(EventKind::Switch, msg);
                Ok(())
            }
            Err(e) => {
                let msg = format!("FAILED to switch to {}: {}", label, reason);
                error!("{} ({})", msg, e);
                state.events.push(EventKind::Error, msg);
                Err(e)
            }
        }
    }
}
