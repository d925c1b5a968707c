//! Bounded record of notable engine transitions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Maximum number of events retained
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Number of events exposed in a status snapshot
pub const RECENT_EVENTS: usize = 20;

/// Category of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Stop,
    Switch,
    Recovery,
    Down,
    GatewayChange,
    Config,
    Error,
}

/// A single logged event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
}

/// Append-only FIFO of at most [`EVENT_LOG_CAPACITY`] events
///
/// Appending to a full log evicts the oldest entry. There is no other way
/// to remove or edit an entry.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    /// Create a log holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event stamped with the current time
    pub fn push(&mut self, kind: EventKind, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Event {
            time: Utc::now(),
            kind,
            message: message.into(),
        });
    }

    /// Copy of the newest `n` events, oldest first
    pub fn recent(&self, n: usize) -> Vec<Event> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
