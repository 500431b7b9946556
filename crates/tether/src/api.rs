use gloo_net::http::Response;
use std::future::Future;

use crate::locator;
use crate::state::ConnectionStateStore;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Server Error")]
    InternalServerError,
    #[error("Unauthorized Access")]
    UnauthorizedAccess,
    #[error("Forbidden Access")]
    ForbiddenAccess,
    #[error("Network error: {0}")]
    NetworkError(gloo_net::Error),
    #[error("Unexpected response status code: {0}")]
    UnexpectedStatusCode(u16),
}

impl ApiError {
    /// `true` when the server could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Maps a non-success status to its error, `None` for 2xx.
fn status_error(status: u16, endpoint: &str) -> Option<ApiError> {
    match status {
        200..=299 => None,
        400 => Some(ApiError::BadRequest(format!("Bad request to {endpoint}"))),
        401 => Some(ApiError::UnauthorizedAccess),
        403 => Some(ApiError::ForbiddenAccess),
        404 => Some(ApiError::NotFound(format!("{endpoint} not found"))),
        500..=599 => Some(ApiError::InternalServerError),
        status => Some(ApiError::UnexpectedStatusCode(status)),
    }
}

fn handle_response_status(response: Response, endpoint: &str) -> ApiResult<Response> {
    match status_error(response.status(), endpoint) {
        None => Ok(response),
        Some(err) => Err(err),
    }
}

/// One in-flight load on a store. A load dropped before it settles counts as finished.
struct PendingLoad<'a> {
    store: &'a ConnectionStateStore,
    settled: bool,
}

impl<'a> PendingLoad<'a> {
    fn start(store: &'a ConnectionStateStore) -> Self {
        store.loading_started();
        Self {
            store,
            settled: false,
        }
    }

    fn settle<T>(mut self, result: &ApiResult<T>) {
        self.settled = true;
        match result {
            Err(err) if err.is_network() => {
                tracing::warn!(error = %err, "Request failed to reach the server");
                self.store.loading_failed();
            }
            _ => self.store.loading_finished(),
        }
    }
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Tracked request dropped before completing");
            self.store.loading_finished();
        }
    }
}

/// Brackets `request` with loading notifications on `store`.
///
/// Any answer from the server finishes the load, error statuses included; only a
/// network failure marks it as failed. Dropping the returned future mid-flight
/// finishes the load.
pub async fn track<T, F>(store: Option<&ConnectionStateStore>, request: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    let Some(store) = store else {
        return request.await;
    };

    let load = PendingLoad::start(store);
    let result = request.await;
    load.settle(&result);
    result
}

#[async_trait::async_trait(?Send)]
pub trait ApiClient {
    /// Sends a `GET` for `endpoint` and returns the raw response.
    async fn make_request(&self, endpoint: &str) -> ApiResult<Response>;

    /// Checks that `endpoint` answers with a success status, ignoring the body.
    async fn ping(&self, endpoint: &str) -> ApiResult<()> {
        let response = self.make_request(endpoint).await?;
        handle_response_status(response, endpoint).map(|_| ())
    }
}

/// HTTP client that reports its round trips to a [`ConnectionStateStore`].
pub struct HttpApiClient {
    root_url: String,
    connection_state: Option<ConnectionStateStore>,
}

impl HttpApiClient {
    /// Creates a client that reports to the installed store, if there is one.
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            connection_state: locator::current(),
        }
    }

    pub fn with_connection_state(mut self, store: ConnectionStateStore) -> Self {
        self.connection_state = Some(store);
        self
    }

    /// Stops reporting round trips.
    pub fn untracked(mut self) -> Self {
        self.connection_state = None;
        self
    }
}

#[async_trait::async_trait(?Send)]
impl ApiClient for HttpApiClient {
    async fn make_request(&self, endpoint: &str) -> ApiResult<Response> {
        let url = format!("{}{}", self.root_url, endpoint);
        let send = gloo_net::http::Request::get(&url).send();

        track(self.connection_state.as_ref(), async {
            send.await.map_err(ApiError::NetworkError)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ConnectionState, StateChangeListener};
    use futures::executor::block_on;
    use futures::future::{pending, poll_fn};
    use std::pin::pin;
    use std::task::Poll;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn network_error() -> ApiError {
        ApiError::NetworkError(gloo_net::Error::GlooError("failed to fetch".to_string()))
    }

    fn recorded(store: &ConnectionStateStore) -> (StateChangeListener, Rc<RefCell<Vec<ConnectionState>>>) {
        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = states.clone();
        let listener: StateChangeListener = Rc::new(move |_, current| sink.borrow_mut().push(current));
        store.add_state_change_listener(&listener);
        (listener, states)
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(status_error(200, "/").is_none());
        assert!(status_error(204, "/").is_none());
        assert!(matches!(status_error(400, "/x"), Some(ApiError::BadRequest(_))));
        assert!(matches!(status_error(401, "/x"), Some(ApiError::UnauthorizedAccess)));
        assert!(matches!(status_error(403, "/x"), Some(ApiError::ForbiddenAccess)));
        assert!(matches!(status_error(404, "/x"), Some(ApiError::NotFound(_))));
        assert!(matches!(status_error(503, "/x"), Some(ApiError::InternalServerError)));
        assert!(matches!(
            status_error(302, "/x"),
            Some(ApiError::UnexpectedStatusCode(302))
        ));
    }

    #[test]
    fn test_track_success_finishes_loading() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        let (_listener, states) = recorded(&store);

        let result = block_on(track(Some(&store), async { Ok::<_, ApiError>(42) }));

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            *states.borrow(),
            vec![ConnectionState::Loading, ConnectionState::Connected]
        );
        assert_eq!(store.loading_count(), 0);
    }

    #[test]
    fn test_track_network_error_fails_loading() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);

        let result = block_on(track(Some(&store), async { Err::<(), _>(network_error()) }));

        assert!(result.unwrap_err().is_network());
        assert_eq!(store.state(), ConnectionState::ConnectionLost);
    }

    #[test]
    fn test_track_http_error_still_connected() {
        let store = ConnectionStateStore::new(ConnectionState::Reconnecting);

        let result = block_on(track(Some(&store), async {
            Err::<(), _>(ApiError::InternalServerError)
        }));

        assert!(result.is_err());
        assert_eq!(store.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_track_nested_inside_outer_load() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        store.loading_started();

        block_on(track(Some(&store), async { Ok::<_, ApiError>(()) })).unwrap();
        assert_eq!(store.state(), ConnectionState::Loading);

        store.loading_finished();
        assert_eq!(store.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_dropped_request_finishes_loading() {
        let store = ConnectionStateStore::new(ConnectionState::Reconnecting);

        {
            let mut request = pin!(track(Some(&store), pending::<ApiResult<()>>()));
            block_on(poll_fn(|cx| {
                assert!(request.as_mut().poll(cx).is_pending());
                Poll::Ready(())
            }));
            assert_eq!(store.state(), ConnectionState::Loading);
            assert_eq!(store.loading_count(), 1);
        }

        assert_eq!(store.state(), ConnectionState::Connected);
        assert_eq!(store.loading_count(), 0);
    }

    #[test]
    fn test_dropped_request_keeps_outer_load() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);
        store.loading_started();

        {
            let mut request = pin!(track(Some(&store), pending::<ApiResult<()>>()));
            block_on(poll_fn(|cx| {
                assert!(request.as_mut().poll(cx).is_pending());
                Poll::Ready(())
            }));
            assert_eq!(store.loading_count(), 2);
        }

        assert_eq!(store.state(), ConnectionState::Loading);
        assert_eq!(store.loading_count(), 1);
    }

    #[test]
    fn test_track_without_store() {
        let result = block_on(track(None, async { Ok::<_, ApiError>("untouched") }));
        assert_eq!(result.unwrap(), "untouched");
    }

    #[test]
    fn test_client_tracking_configuration() {
        let store = ConnectionStateStore::new(ConnectionState::Connected);

        let client = HttpApiClient::new("http://localhost:8080").with_connection_state(store.clone());
        assert!(client.connection_state.as_ref().is_some_and(|s| s.ptr_eq(&store)));

        let client = client.untracked();
        assert!(client.connection_state.is_none());
    }
}
