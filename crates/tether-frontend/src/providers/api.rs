use tether::ConnectionStateStore;
use tether::api::{ApiClient, ApiError, HttpApiClient};

/// The API client for the demo application, reporting every request to the connection store.
pub struct Api {
    client: HttpApiClient,
}

impl Api {
    pub fn new(base_url: &str, store: ConnectionStateStore) -> Self {
        Api {
            client: HttpApiClient::new(base_url).with_connection_state(store),
        }
    }

    /// Checks that the server hosting the page still answers.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.client.ping("/").await
    }
}

/// Create a new API client for the page's own origin.
pub fn create(store: ConnectionStateStore) -> Api {
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default();
    Api::new(&origin, store)
}
