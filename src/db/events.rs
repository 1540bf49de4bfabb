//! Passive connection observers.
//!
//! Translates the driver's SDAM (server discovery and monitoring) events into
//! `LifecycleEvent`s, publishes the resulting state and logs the three
//! transitions of interest: connected, error and disconnected. Observers never
//! reconnect or otherwise alter control flow.

use std::sync::Arc;

use mongodb::event::sdam::SdamEvent;
use mongodb::event::EventHandler;
use tokio::sync::watch;

use crate::db::state::{ConnectionState, LifecycleEvent};
use crate::observability::metrics;

/// Map a driver event onto the connector's lifecycle, if it is one we track.
pub fn classify(event: &SdamEvent) -> Option<(LifecycleEvent, String)> {
    match event {
        SdamEvent::ServerHeartbeatSucceeded(ev) => {
            Some((LifecycleEvent::HeartbeatSucceeded, ev.server_address.to_string()))
        }
        SdamEvent::ServerHeartbeatFailed(ev) => Some((
            LifecycleEvent::HeartbeatFailed(ev.failure.to_string()),
            ev.server_address.to_string(),
        )),
        SdamEvent::ServerClosed(ev) => Some((LifecycleEvent::Closed, ev.address.to_string())),
        SdamEvent::TopologyClosed(_) => Some((LifecycleEvent::Closed, "topology".to_string())),
        _ => None,
    }
}

/// Apply an event to the shared state and log the transition it caused.
pub fn observe(state: &watch::Sender<ConnectionState>, event: LifecycleEvent, source: &str) {
    let mut transitioned = None;
    state.send_if_modified(|current| match current.on_event(&event) {
        Some(next) => {
            *current = next;
            transitioned = Some(next);
            true
        }
        None => false,
    });

    let Some(next) = transitioned else {
        return;
    };
    metrics::record_db_state(next);

    match (&event, next) {
        (_, ConnectionState::Connected) => {
            tracing::info!(server = %source, "Database connection established");
        }
        (LifecycleEvent::HeartbeatFailed(reason), _) => {
            tracing::error!(server = %source, error = %reason, "Database connection error");
        }
        (_, ConnectionState::Disconnected) => {
            tracing::warn!(server = %source, "Database disconnected");
        }
        _ => {}
    }
}

/// Build the driver callback that feeds `observe`.
pub fn handler(state: Arc<watch::Sender<ConnectionState>>) -> EventHandler<SdamEvent> {
    EventHandler::callback(move |event: SdamEvent| {
        if let Some((lifecycle, source)) = classify(&event) {
            observe(&state, lifecycle, &source);
        }
    })
}
