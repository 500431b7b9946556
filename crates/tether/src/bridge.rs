//! The service worker connection-lost probe.
//!
//! At startup the frontend asks the active service worker whether the most recent fetch
//! was served from its cache because the server was unreachable. The exchange is a
//! single JSON-RPC style request and at most one matching response.

use std::cell::Cell;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::{ConnectionState, ConnectionStateStore};

/// Method name and correlation id of the probe request.
pub const CONNECTION_LOST_PROBE_ID: &str = "Vaadin.ServiceWorker.isConnectionLost";

/// The message posted to the service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub method: String,
    pub id: String,
}

impl Default for ProbeRequest {
    fn default() -> Self {
        Self {
            method: CONNECTION_LOST_PROBE_ID.to_string(),
            id: CONNECTION_LOST_PROBE_ID.to_string(),
        }
    }
}

/// What the probe did with an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Not a response to the probe, or the probe already settled.
    Ignored,
    /// The response was applied; the probe will ignore everything from now on.
    Settled { connection_lost: bool },
}

impl ProbeOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, ProbeOutcome::Settled { .. })
    }
}

/// One-shot handler for the probe response.
pub struct ConnectionLostProbe {
    store: ConnectionStateStore,
    settled: Cell<bool>,
}

impl ConnectionLostProbe {
    pub fn new(store: ConnectionStateStore) -> Self {
        Self {
            store,
            settled: Cell::new(false),
        }
    }

    pub fn request(&self) -> ProbeRequest {
        ProbeRequest::default()
    }

    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }

    /// Handles a message received from the service worker.
    ///
    /// Only an object whose `id` is [`CONNECTION_LOST_PROBE_ID`] is considered. A `result`
    /// of exactly `true` forces [`ConnectionState::ConnectionLost`]; any other result
    /// settles the probe without touching the store.
    pub fn handle_message(&self, data: &Value) -> ProbeOutcome {
        if self.settled.get() {
            return ProbeOutcome::Ignored;
        }

        let Some(message) = data.as_object() else {
            return ProbeOutcome::Ignored;
        };
        if message.get("id").and_then(Value::as_str) != Some(CONNECTION_LOST_PROBE_ID) {
            return ProbeOutcome::Ignored;
        }

        self.settled.set(true);
        let connection_lost = message.get("result") == Some(&Value::Bool(true));
        tracing::debug!(connection_lost, "Service worker answered connection probe");
        if connection_lost {
            self.store.set_state(ConnectionState::ConnectionLost);
        }

        ProbeOutcome::Settled { connection_lost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_format() {
        let request = serde_json::to_value(ProbeRequest::default()).unwrap();
        assert_eq!(
            request,
            json!({
                "method": "Vaadin.ServiceWorker.isConnectionLost",
                "id": "Vaadin.ServiceWorker.isConnectionLost",
            })
        );
    }

    #[test]
    fn test_true_result_forces_connection_lost() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        let probe = ConnectionLostProbe::new(store.clone());

        let outcome = probe.handle_message(&json!({
            "id": CONNECTION_LOST_PROBE_ID,
            "result": true,
        }));

        assert_eq!(outcome, ProbeOutcome::Settled { connection_lost: true });
        assert_eq!(store.state(), ConnectionState::ConnectionLost);
        assert!(probe.is_settled());
    }

    #[test]
    fn test_false_result_settles_without_change() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        let probe = ConnectionLostProbe::new(store.clone());

        let outcome = probe.handle_message(&json!({
            "id": CONNECTION_LOST_PROBE_ID,
            "result": false,
        }));

        assert_eq!(outcome, ProbeOutcome::Settled { connection_lost: false });
        assert_eq!(store.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_truthy_non_boolean_result_is_not_true() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        let probe = ConnectionLostProbe::new(store.clone());

        probe.handle_message(&json!({ "id": CONNECTION_LOST_PROBE_ID, "result": "true" }));

        assert_eq!(store.state(), ConnectionState::Connected);
        assert!(probe.is_settled());
    }

    #[test]
    fn test_unrelated_messages_are_ignored() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        let probe = ConnectionLostProbe::new(store.clone());

        assert_eq!(probe.handle_message(&json!("hello")), ProbeOutcome::Ignored);
        assert_eq!(probe.handle_message(&json!(null)), ProbeOutcome::Ignored);
        assert_eq!(
            probe.handle_message(&json!({ "id": "other", "result": true })),
            ProbeOutcome::Ignored
        );
        assert_eq!(
            probe.handle_message(&json!({ "result": true })),
            ProbeOutcome::Ignored
        );

        assert!(!probe.is_settled());
        assert_eq!(store.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_applies_at_most_one_response() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        let probe = ConnectionLostProbe::new(store.clone());

        probe.handle_message(&json!({ "id": CONNECTION_LOST_PROBE_ID, "result": false }));
        let second = probe.handle_message(&json!({ "id": CONNECTION_LOST_PROBE_ID, "result": true }));

        assert_eq!(second, ProbeOutcome::Ignored);
        assert_eq!(store.state(), ConnectionState::Connected);
    }
}
