// # iproute2 Collaborators
//
// This crate implements the engine's side-effecting traits on Linux by
// shelling out to the system `ping` and `ip` binaries:
//
// - [`PingProbe`]: `Probe` via `ping -I <iface>`, with a pinned host route
// - [`RouteTableResolver`]: `GatewayResolver` via `ip route show dev <iface>`
// - [`IpRouteController`]: `RouteController` via `ip route replace default ...`
//
// ## Timeouts
//
// Every subprocess runs under `tokio::time::timeout` and is killed when the
// bound expires. The engine holds its lock while these calls run, so none
// of them may block indefinitely.
//
// ## Platform Support
//
// The crate builds everywhere, but the commands only exist on Linux. On
// other systems every probe reports unreachable and every route change
// fails.

mod command;
mod ping;
mod route;

pub use command::{IP_BIN, PING_BIN};
pub use ping::PingProbe;
pub use route::{
    IpRouteController, RouteTableResolver, parse_default_interface, parse_interface_gateway,
};
