//! Connection state machine.
//!
//! # States
//! - Disconnected: no client, or the client was closed
//! - Connecting: initial connect in progress
//! - Connected: server reachable
//! - Error: last heartbeat failed (the driver keeps monitoring)
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: connect() called
//! Connecting → Connected: ping succeeded
//! Connecting → Error: connect() failed
//! Connected → Error: heartbeat failed
//! Error → Connected: heartbeat succeeded
//! any → Disconnected: server/topology closed, or close()
//! ```

use std::fmt;

use serde::Serialize;

/// Observable state of the database connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver-level events the connector reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    HeartbeatSucceeded,
    HeartbeatFailed(String),
    Closed,
}

impl ConnectionState {
    /// State after `event`, or `None` when the event changes nothing.
    ///
    /// Heartbeats arriving while `Connecting` are ignored: the initial
    /// connect owns that transition.
    pub fn on_event(self, event: &LifecycleEvent) -> Option<ConnectionState> {
        let next = match (self, event) {
            (ConnectionState::Connecting, LifecycleEvent::HeartbeatSucceeded) => return None,
            (ConnectionState::Disconnected, LifecycleEvent::HeartbeatSucceeded) => return None,
            (_, LifecycleEvent::HeartbeatSucceeded) => ConnectionState::Connected,
            (ConnectionState::Disconnected, LifecycleEvent::HeartbeatFailed(_)) => return None,
            (_, LifecycleEvent::HeartbeatFailed(_)) => ConnectionState::Error,
            (_, LifecycleEvent::Closed) => ConnectionState::Disconnected,
        };
        (next != self).then_some(next)
    }
}

/// Metadata recorded after a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.database, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_failure_then_recovery() {
        let failed = LifecycleEvent::HeartbeatFailed("timeout".into());
        assert_eq!(ConnectionState::Connected.on_event(&failed), Some(ConnectionState::Error));
        assert_eq!(ConnectionState::Error.on_event(&failed), None);
        assert_eq!(
            ConnectionState::Error.on_event(&LifecycleEvent::HeartbeatSucceeded),
            Some(ConnectionState::Connected)
        );
    }

    #[test]
    fn steady_heartbeats_do_not_transition() {
        assert_eq!(ConnectionState::Connected.on_event(&LifecycleEvent::HeartbeatSucceeded), None);
        assert_eq!(ConnectionState::Connecting.on_event(&LifecycleEvent::HeartbeatSucceeded), None);
    }

    #[test]
    fn closed_always_disconnects() {
        for state in [ConnectionState::Connecting, ConnectionState::Connected, ConnectionState::Error] {
            assert_eq!(state.on_event(&LifecycleEvent::Closed), Some(ConnectionState::Disconnected));
        }
        assert_eq!(ConnectionState::Disconnected.on_event(&LifecycleEvent::Closed), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ConnectionState::Connected).unwrap(), "\"connected\"");
        assert_eq!(ConnectionState::Error.to_string(), "error");
    }
}
