#[macro_export]
/// Define an async Yew callback, cloning the listed variables into it.
///
/// Each variable is cloned once when the callback is built and once more per
/// invocation, then moved into a task spawned with `wasm_bindgen_futures::spawn_local`.
///
/// Without an event parameter:
/// ```compile_fail
/// let ping = async_callback!([client, status] {
///     status.set(None);
///     match client.ping("/").await {
///         Ok(()) => status.set(Some("Server reachable".to_string())),
///         Err(err) => status.set(Some(format!("Ping failed: {err}"))),
///     }
/// });
/// ```
///
/// With an event parameter:
/// ```compile_fail
/// let on_submit = async_callback!([client] |event| {
///     event.prevent_default();
///     let _ = client.ping("/").await;
/// });
/// ```
macro_rules! async_callback {
    ([$($var:ident),* $(,)?] $body:expr) => {
        {
            $(let $var = $var.clone();)*
            Callback::from(move |_| {
                $(let $var = $var.clone();)*
                wasm_bindgen_futures::spawn_local(async move {
                    $body
                });
            })
        }
    };

    ([$($var:ident),* $(,)?] |$event:ident| $body:expr) => {
        {
            $(let $var = $var.clone();)*
            Callback::from(move |$event| {
                $(let $var = $var.clone();)*
                wasm_bindgen_futures::spawn_local(async move {
                    $body
                });
            })
        }
    };
}
