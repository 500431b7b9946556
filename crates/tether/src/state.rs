//! The connection state store.
//!
//! A single [`ConnectionStateStore`] holds the application's current [`ConnectionState`]
//! and notifies its listeners synchronously whenever that state changes. Application code
//! brackets server round trips with [`ConnectionStateStore::loading_started`] and
//! [`ConnectionStateStore::loading_finished`] / [`ConnectionStateStore::loading_failed`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

/// The connectivity state of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    /// The last transaction over the wire succeeded.
    Connected,
    /// Connected, with at least one request in flight.
    Loading,
    /// Temporarily disconnected; reconnection is being attempted.
    Reconnecting,
    /// Permanently disconnected until something reports otherwise.
    ConnectionLost,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Loading => "loading",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::ConnectionLost => "connection-lost",
        }
    }

    /// `true` for [`ConnectionState::Connected`] and [`ConnectionState::Loading`].
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Loading)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change listener, called with `(previous, current)`.
///
/// Listeners are identified by their `Rc` allocation, so keep the `Rc` around
/// to remove the listener later.
pub type StateChangeListener = Rc<dyn Fn(ConnectionState, ConnectionState)>;

struct StoreInner {
    state: Cell<ConnectionState>,
    loading_count: Cell<u32>,
    listeners: RefCell<Vec<StateChangeListener>>,
}

/// Observable holder of the current [`ConnectionState`].
///
/// Cloning the store is cheap and yields another handle to the same state.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use tether::state::{ConnectionState, ConnectionStateStore, StateChangeListener};
///
/// let store = ConnectionStateStore::new(ConnectionState::Connected);
/// let listener: StateChangeListener = Rc::new(|previous, current| {
///     println!("{previous} -> {current}");
/// });
/// store.add_state_change_listener(&listener);
///
/// store.loading_started();
/// assert_eq!(store.state(), ConnectionState::Loading);
/// store.loading_finished();
/// assert_eq!(store.state(), ConnectionState::Connected);
/// ```
#[derive(Clone)]
pub struct ConnectionStateStore {
    inner: Rc<StoreInner>,
}

impl ConnectionStateStore {
    pub fn new(initial_state: ConnectionState) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: Cell::new(initial_state),
                loading_count: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.get()
    }

    /// Sets the state directly.
    ///
    /// When the state actually changes, the loading count is reset to zero and every
    /// listener is called with `(previous, current)` in registration order. Setting the
    /// current state again is a no-op.
    pub fn set_state(&self, new_state: ConnectionState) {
        let previous = self.inner.state.get();
        if previous == new_state {
            return;
        }

        self.inner.state.set(new_state);
        self.inner.loading_count.set(0);
        tracing::debug!(%previous, current = %new_state, "Connection state changed");

        // Snapshot so listeners may (un)register listeners or change the state while notified.
        let listeners: Vec<StateChangeListener> = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(previous, new_state);
        }
    }

    /// Registers a listener. Adding the same listener twice registers it once.
    pub fn add_state_change_listener(&self, listener: &StateChangeListener) {
        let mut listeners = self.inner.listeners.borrow_mut();
        if !listeners.iter().any(|existing| same_listener(existing, listener)) {
            listeners.push(Rc::clone(listener));
        }
    }

    /// Removes a listener if it is registered.
    pub fn remove_state_change_listener(&self, listener: &StateChangeListener) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|existing| !same_listener(existing, listener));
    }

    /// Marks the start of a server round trip.
    ///
    /// The state is set to [`ConnectionState::Loading`] first (which resets the count
    /// if the state changed), then the count is incremented.
    pub fn loading_started(&self) {
        self.set_state(ConnectionState::Loading);
        self.inner.loading_count.set(self.inner.loading_count.get() + 1);
    }

    /// Marks a round trip as finished; the last one returns the state to
    /// [`ConnectionState::Connected`].
    pub fn loading_finished(&self) {
        self.decrease_loading_count(ConnectionState::Connected);
    }

    /// Marks a round trip as failed; the last one moves the state to
    /// [`ConnectionState::ConnectionLost`].
    pub fn loading_failed(&self) {
        self.decrease_loading_count(ConnectionState::ConnectionLost);
    }

    fn decrease_loading_count(&self, final_state: ConnectionState) {
        let count = self.inner.loading_count.get();
        if count > 0 {
            self.inner.loading_count.set(count - 1);
            if count == 1 {
                self.set_state(final_state);
            }
        }
    }

    /// Number of round trips currently in flight.
    pub fn loading_count(&self) -> u32 {
        self.inner.loading_count.get()
    }

    pub fn online(&self) -> bool {
        self.state().is_online()
    }

    pub fn offline(&self) -> bool {
        !self.online()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Returns a weak handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakConnectionStateStore {
        WeakConnectionStateStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// `true` when both handles point to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ConnectionStateStore {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ConnectionStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStateStore")
            .field("state", &self.state())
            .field("loading_count", &self.loading_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Weak counterpart of [`ConnectionStateStore`], for listeners that need to read the store.
#[derive(Clone)]
pub struct WeakConnectionStateStore {
    inner: Weak<StoreInner>,
}

impl WeakConnectionStateStore {
    pub fn upgrade(&self) -> Option<ConnectionStateStore> {
        self.inner.upgrade().map(|inner| ConnectionStateStore { inner })
    }
}

fn same_listener(a: &StateChangeListener, b: &StateChangeListener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
