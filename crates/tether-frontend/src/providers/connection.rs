use tether::ConnectionStateStore;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct ConnectionContext {
    pub store: ConnectionStateStore,
}

#[derive(Properties, PartialEq)]
pub struct ConnectionProviderProps {
    pub store: ConnectionStateStore,
    pub children: Children,
}

/// Hands the connection state store down to every component below it.
#[function_component(ConnectionProvider)]
pub fn connection_provider(props: &ConnectionProviderProps) -> Html {
    let context = ConnectionContext {
        store: props.store.clone(),
    };

    html! {
        <ContextProvider<ConnectionContext> context={context}>
            {props.children.clone()}
        </ContextProvider<ConnectionContext>>
    }
}

#[hook]
pub fn use_connection_store() -> ConnectionStateStore {
    use_context::<ConnectionContext>()
        .expect("use_connection_store must be used within a ConnectionProvider")
        .store
}
