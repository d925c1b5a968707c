// # Gateway Resolver Implementations
//
// This module provides resolvers that need nothing beyond the filesystem,
// plus a combinator for chaining resolvers in priority order.

pub mod state_file;
pub mod fallback;

pub use state_file::StateFileResolver;
pub use fallback::FallbackResolver;
