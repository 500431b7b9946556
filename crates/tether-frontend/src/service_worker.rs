//! Asks the service worker whether the page was served while the server was unreachable.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use tether::bridge::ConnectionLostProbe;
use tether::errors::BridgeError;
use tether::log::{debug, warn};
use tether::serde_json::{self, Value};
use tether::ConnectionStateStore;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{MessageEvent, ServiceWorkerRegistration};

fn js_error(value: JsValue) -> BridgeError {
    BridgeError::Js(format!("{value:?}"))
}

fn message_json(data: &JsValue) -> Option<Value> {
    let text = js_sys::JSON::stringify(data).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}

/// Sends the connection-lost probe and applies the first matching answer to `store`.
///
/// Returns [`BridgeError::Unavailable`] when the page has no service worker container,
/// e.g. outside a secure context.
pub fn probe_connection_lost(store: &ConnectionStateStore) -> Result<(), BridgeError> {
    let window = web_sys::window().ok_or(BridgeError::Unavailable)?;
    let navigator = window.navigator();
    let has_container = js_sys::Reflect::get(&navigator, &JsValue::from_str("serviceWorker"))
        .map(|container| !container.is_undefined())
        .unwrap_or(false);
    if !has_container {
        return Err(BridgeError::Unavailable);
    }
    let container = navigator.service_worker();

    let probe = Rc::new(ConnectionLostProbe::new(store.clone()));
    let request = js_sys::JSON::parse(&serde_json::to_string(&probe.request())?).map_err(js_error)?;

    let listener_slot: Rc<RefCell<Option<EventListener>>> = Rc::new(RefCell::new(None));
    let listener = {
        let probe = probe.clone();
        let listener_slot = listener_slot.clone();
        EventListener::new(&container, "message", move |event| {
            let Some(event) = event.dyn_ref::<MessageEvent>() else {
                return;
            };
            let Some(data) = message_json(&event.data()) else {
                return;
            };
            if probe.handle_message(&data).is_settled() {
                // The listener cannot be dropped from inside its own callback.
                let listener_slot = listener_slot.clone();
                spawn_local(async move {
                    listener_slot.borrow_mut().take();
                });
            }
        })
    };
    *listener_slot.borrow_mut() = Some(listener);

    let ready = container.ready().map_err(js_error)?;
    spawn_local(async move {
        let sent: Result<(), BridgeError> = async {
            let registration: ServiceWorkerRegistration =
                JsFuture::from(ready).await.map_err(js_error)?.unchecked_into();
            let active = registration.active().ok_or(BridgeError::NoActiveWorker)?;
            active.post_message(&request).map_err(js_error)
        }
        .await;

        match sent {
            Ok(()) => debug!("Sent connection probe to service worker"),
            Err(err) => warn!(error = %err, "Connection probe not sent"),
        }
    });

    Ok(())
}
