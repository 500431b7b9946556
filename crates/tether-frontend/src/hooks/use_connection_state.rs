use std::rc::Rc;

use tether::state::StateChangeListener;
use tether::{ConnectionState, ConnectionStateStore};
use yew::prelude::*;

/// Re-renders the calling component whenever `store` changes state.
#[hook]
pub fn use_connection_state(store: &ConnectionStateStore) -> ConnectionState {
    let state = use_state(|| store.state());

    use_effect_with(store.clone(), {
        let state = state.clone();
        move |store: &ConnectionStateStore| {
            state.set(store.state());

            let listener: StateChangeListener = {
                let state = state.clone();
                Rc::new(move |_, current| state.set(current))
            };
            store.add_state_change_listener(&listener);

            let store = store.clone();
            move || store.remove_state_change_listener(&listener)
        }
    });

    *state
}
