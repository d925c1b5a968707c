// # wanfo-core
//
// Core library for the dual-WAN failover daemon.
//
// ## Architecture Overview
//
// This library owns every failover decision:
// - **Probe**: Trait for checking internet and gateway reachability per link
// - **GatewayResolver**: Trait for discovering a link's current gateway
// - **RouteController**: Trait for moving the kernel default route
// - **FailoverEngine**: Core engine that turns probe results into route changes
//
// Platform specifics (ping, iproute2) live in `wanfo-iproute`, the REST
// surface in `wanfo-api`, and process wiring in `wanfod`.
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions here, side effects behind traits
// 2. **Single Lock**: Scheduler and API commands serialize on one mutex
// 3. **Hysteresis**: Fail over fast, switch back slowly
// 4. **Library-First**: The engine can be driven entirely from tests

pub mod traits;
pub mod engine;
pub mod link;
pub mod gateway;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{GatewayResolver, Probe, RouteController};
pub use engine::{
    CycleOutcome, Event, EventKind, EventLog, FailoverEngine, ManualSwitch, StatusSnapshot,
};
pub use link::{Link, LinkStatus};
pub use gateway::{FallbackResolver, StateFileResolver};
pub use config::{ApiConfig, FailoverConfig, LinkConfig};
pub use error::{Error, Result};
