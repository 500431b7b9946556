//! The well-known connection state store of the page.
//!
//! Components get the store passed in. Code that has no way to receive it, like request
//! interceptors or the bootstrap, looks it up here instead.

use std::cell::RefCell;

use crate::state::ConnectionStateStore;

thread_local! {
    static INSTALLED: RefCell<Option<ConnectionStateStore>> = const { RefCell::new(None) };
}

/// Installs `store` unless one is already installed, and returns the installed store.
pub fn install(store: ConnectionStateStore) -> ConnectionStateStore {
    get_or_install_with(move || store)
}

/// Returns the installed store, creating it with `init` if there is none yet.
///
/// `init` runs outside the registry borrow, so it may call [`current`] itself.
pub fn get_or_install_with(init: impl FnOnce() -> ConnectionStateStore) -> ConnectionStateStore {
    if let Some(store) = current() {
        return store;
    }

    let store = init();
    INSTALLED.with(|installed| {
        installed
            .borrow_mut()
            .get_or_insert_with(|| {
                tracing::debug!(state = %store.state(), "Installed connection state store");
                store
            })
            .clone()
    })
}

pub fn current() -> Option<ConnectionStateStore> {
    INSTALLED.with(|installed| installed.borrow().clone())
}

/// Removes the installed store and returns it.
pub fn uninstall() -> Option<ConnectionStateStore> {
    INSTALLED.with(|installed| installed.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ConnectionState;

    #[test]
    fn test_nothing_installed_after_uninstall() {
        uninstall();
        assert!(current().is_none());
    }

    #[test]
    fn test_first_install_wins() {
        uninstall();
        let first = ConnectionStateStore::new(ConnectionState::Connected);
        let second = ConnectionStateStore::new(ConnectionState::ConnectionLost);

        let installed = install(first.clone());
        assert!(installed.ptr_eq(&first));

        let installed = install(second);
        assert!(installed.ptr_eq(&first));
        assert_eq!(current().map(|s| s.state()), Some(ConnectionState::Connected));
    }

    #[test]
    fn test_get_or_install_with_runs_init_once() {
        uninstall();
        let mut calls = 0;
        let store = get_or_install_with(|| {
            calls += 1;
            ConnectionStateStore::new(ConnectionState::Reconnecting)
        });
        let again = get_or_install_with(|| {
            calls += 1;
            ConnectionStateStore::new(ConnectionState::Connected)
        });

        assert_eq!(calls, 1);
        assert!(store.ptr_eq(&again));
    }

    #[test]
    fn test_init_may_look_up_current() {
        uninstall();
        let store = get_or_install_with(|| {
            assert!(current().is_none());
            ConnectionStateStore::new(ConnectionState::Connected)
        });

        assert!(current().is_some_and(|installed| installed.ptr_eq(&store)));
    }

    #[test]
    fn test_uninstall() {
        uninstall();
        let store = install(ConnectionStateStore::new(ConnectionState::Connected));
        let removed = uninstall().unwrap();

        assert!(removed.ptr_eq(&store));
        assert!(current().is_none());
    }

    #[test]
    fn test_mutations_visible_through_locator() {
        uninstall();
        let store = install(ConnectionStateStore::new(ConnectionState::Connected));
        current().unwrap().loading_started();
        assert_eq!(store.state(), ConnectionState::Loading);
    }
}
