mod components;
mod config;
mod hooks;
mod network;
mod pages;
mod popover;
mod providers;
mod scheduler;
mod service_worker;

use yew::prelude::*;

use tether::log::debug;
use tether::{ConnectionStateStore, IndicatorConfig, host, locator};

use components::ConnectionIndicator;
use pages::HomePage;
use providers::ConnectionProvider;

#[derive(Properties, PartialEq)]
struct AppProps {
    store: ConnectionStateStore,
    config: IndicatorConfig,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    html! {
        <ConnectionProvider store={props.store.clone()}>
            <ConnectionIndicator store={props.store.clone()} config={props.config.clone()} />
            <HomePage />
        </ConnectionProvider>
    }
}

/// Installs the page's connection state store, guessing the initial state from the host.
fn install_store() -> ConnectionStateStore {
    locator::get_or_install_with(|| {
        let window = web_sys::window();
        let hostname = window
            .as_ref()
            .and_then(|window| window.location().hostname().ok())
            .unwrap_or_default();
        let online = window
            .as_ref()
            .map(|window| window.navigator().on_line())
            .unwrap_or(true);
        ConnectionStateStore::new(host::initial_state(&hostname, online))
    })
}

fn main() {
    tether::log::setup().expect("Failed to setup logging");

    let store = install_store();
    if let Err(err) = service_worker::probe_connection_lost(&store) {
        debug!(error = %err, "Skipping service worker connection probe");
    }
    network::watch(&store);

    let config = config::load_indicator_config();
    yew::Renderer::<App>::with_props(AppProps { store, config }).render();
}
