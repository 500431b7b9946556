use tether::async_callback;
use tether::{ConnectionState, ConnectionStateStore};
use web_sys::MouseEvent;
use yew::prelude::*;

use crate::config::INDICATOR_CONFIG_KEY;
use crate::hooks::use_connection_state;
use crate::providers::{api, use_connection_store};

const BUTTON_CLASSES: &str = "bg-blue-600 text-white px-4 py-2 rounded hover:bg-blue-700 disabled:opacity-50 cursor-pointer";
const DANGER_BUTTON_CLASSES: &str = "bg-red-600 text-white px-4 py-2 rounded hover:bg-red-700 cursor-pointer";

fn state_classes(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connected => "text-green-600 dark:text-green-400",
        ConnectionState::Loading => "text-blue-600 dark:text-blue-400",
        ConnectionState::Reconnecting => "text-yellow-600 dark:text-yellow-400",
        ConnectionState::ConnectionLost => "text-red-600 dark:text-red-400",
    }
}

/// Runs `action` on the store and re-renders, since nested loads change only the count.
fn store_action(
    store: &ConnectionStateStore,
    force_update: &UseForceUpdateHandle,
    action: fn(&ConnectionStateStore),
) -> Callback<MouseEvent> {
    let store = store.clone();
    let force_update = force_update.clone();
    Callback::from(move |_: MouseEvent| {
        action(&store);
        force_update.force_update();
    })
}

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let store = use_connection_store();
    let state = use_connection_state(&store);
    let force_update = use_force_update();
    let api = use_memo(store.clone(), |store| api::create(store.clone()));
    let ping_result = use_state(|| None::<Result<(), String>>);

    let ping = async_callback!([api, ping_result] {
        ping_result.set(None);
        match api.ping().await {
            Ok(()) => ping_result.set(Some(Ok(()))),
            Err(err) => ping_result.set(Some(Err(format!("Ping failed: {err}")))),
        }
    });

    html! {
        <div class="p-8">
            <h1 class="text-2xl font-bold mb-4">{ "Tether Connection Indicator" }</h1>

            // Current store state
            <div class="mb-8 p-4 border border-gray-200 rounded">
                <span class="font-medium">{ "State: " }</span>
                <span class={state_classes(state)}>{ state.to_string() }</span>
                <span class="ml-4 text-gray-600">{ format!("Loads in flight: {}", store.loading_count()) }</span>
            </div>

            // Loading bracketing
            <div class="mb-8 p-4 border border-gray-200 rounded">
                <h2 class="text-xl font-semibold mb-4">{ "Loading" }</h2>
                <div class="space-x-2">
                    <button class={BUTTON_CLASSES}
                        onclick={store_action(&store, &force_update, ConnectionStateStore::loading_started)}>
                        { "Start loading" }
                    </button>
                    <button class={BUTTON_CLASSES}
                        onclick={store_action(&store, &force_update, ConnectionStateStore::loading_finished)}>
                        { "Finish loading" }
                    </button>
                    <button class={DANGER_BUTTON_CLASSES}
                        onclick={store_action(&store, &force_update, ConnectionStateStore::loading_failed)}>
                        { "Fail loading" }
                    </button>
                </div>
            </div>

            // Direct state changes
            <div class="mb-8 p-4 border border-gray-200 rounded">
                <h2 class="text-xl font-semibold mb-4">{ "Connection" }</h2>
                <div class="space-x-2">
                    <button class={BUTTON_CLASSES}
                        onclick={store_action(&store, &force_update, |store| store.set_state(ConnectionState::Connected))}>
                        { "Connected" }
                    </button>
                    <button class={BUTTON_CLASSES}
                        onclick={store_action(&store, &force_update, |store| store.set_state(ConnectionState::Reconnecting))}>
                        { "Reconnecting" }
                    </button>
                    <button class={DANGER_BUTTON_CLASSES}
                        onclick={store_action(&store, &force_update, |store| store.set_state(ConnectionState::ConnectionLost))}>
                        { "Connection lost" }
                    </button>
                </div>
            </div>

            // Tracked request
            <div class="mb-8 p-4 border border-gray-200 rounded">
                <h2 class="text-xl font-semibold mb-4">{ "Server" }</h2>
                <button class={BUTTON_CLASSES} onclick={ping}>{ "Ping server" }</button>
                {
                    match ping_result.as_ref() {
                        Some(Ok(())) => html! {
                            <div class="mt-4 p-4 bg-green-100 rounded">
                                <p>{ "Server reachable" }</p>
                            </div>
                        },
                        Some(Err(error)) => html! {
                            <div class="mt-4 p-4 bg-red-100 text-red-700 rounded">
                                <p>{ error.clone() }</p>
                            </div>
                        },
                        None => html! {},
                    }
                }
            </div>

            <p class="text-sm text-gray-600">
                { format!("Indicator delays and texts can be overridden with a JSON object in local storage under \"{INDICATOR_CONFIG_KEY}\".") }
            </p>
        </div>
    }
}
