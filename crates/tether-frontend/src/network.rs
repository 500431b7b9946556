//! Feeds the browser's `online` / `offline` events into the store.

use gloo_events::EventListener;
use tether::log::{info, warn};
use tether::{ConnectionState, ConnectionStateStore};
use wasm_bindgen_futures::spawn_local;

use crate::providers::api;

/// Going offline loses the connection outright. Coming back online only means a
/// network link exists, so the store reconnects and then verifies with a tracked ping.
pub fn watch(store: &ConnectionStateStore) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let offline = {
        let store = store.clone();
        EventListener::new(&window, "offline", move |_| {
            info!("Browser went offline");
            store.set_state(ConnectionState::ConnectionLost);
        })
    };

    let online = {
        let store = store.clone();
        EventListener::new(&window, "online", move |_| {
            info!("Browser back online, verifying server connection");
            store.set_state(ConnectionState::Reconnecting);

            let api = api::create(store.clone());
            spawn_local(async move {
                if let Err(err) = api.ping().await {
                    warn!(error = %err, "Server check after reconnect failed");
                }
            });
        })
    };

    // Both listeners live as long as the page.
    offline.forget();
    online.forget();
}
