//! Error types for the failover system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for failover operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the failover system
#[derive(Error, Debug)]
pub enum Error {
    /// A command named a link that is not configured
    #[error("Unknown link: {0}")]
    UnknownLink(String),

    /// A switch targeted a link whose gateway has not been resolved
    #[error("No gateway detected for {link} ({interface})")]
    NoGateway {
        /// Label of the target link
        link: String,
        /// Interface of the target link
        interface: String,
    },

    /// Replacing the default route failed
    #[error("Route switch failed: {0}")]
    RouteSwitch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (subprocesses, state files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an unknown-link error
    pub fn unknown_link(name: impl Into<String>) -> Self {
        Self::UnknownLink(name.into())
    }

    /// Create a missing-gateway error
    pub fn no_gateway(link: impl Into<String>, interface: impl Into<String>) -> Self {
        Self::NoGateway {
            link: link.into(),
            interface: interface.into(),
        }
    }

    /// Create a route switch error
    pub fn route_switch(msg: impl Into<String>) -> Self {
        Self::RouteSwitch(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error was caused by the caller's input rather than the system
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnknownLink(_))
    }
}
