//! Core traits for the failover system
//!
//! This module defines the abstract interfaces the engine calls out to.
//!
//! - [`Probe`]: Reachability checks through a link's interface
//! - [`GatewayResolver`]: Discovery of a link's current gateway address
//! - [`RouteController`]: Replacement of the kernel default route

pub mod probe;
pub mod gateway_resolver;
pub mod route_controller;

pub use probe::Probe;
pub use gateway_resolver::GatewayResolver;
pub use route_controller::RouteController;
