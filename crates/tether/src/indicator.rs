//! The connection indicator state machine.
//!
//! [`ConnectionIndicator`] subscribes to a [`ConnectionStateStore`] and derives what a
//! connection indicator should display: the `offline`, `reconnecting`, `loading` and
//! `expanded` flags, a staged loading bar, and the status message. It is renderer
//! agnostic; a frontend supplies a [`Scheduler`] for the delayed transitions and a
//! [`Surface`] that is shown while there is something to display.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::{ConnectionState, ConnectionStateStore, StateChangeListener};
use crate::timer::{Scheduler, TimerCallback, TimerSlot, TimerSlots};

/// The element the indicator surfaces itself on, e.g. a popover.
pub trait Surface {
    fn show(&self);
    fn hide(&self);
}

/// Appearance and timing of a [`ConnectionIndicator`]. Delays are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndicatorConfig {
    /// Delay before the loading bar shows its first stage.
    pub first_delay: u32,
    /// Delay before the loading bar goes into its second stage.
    pub second_delay: u32,
    /// Delay before the loading bar goes into its third stage.
    pub third_delay: u32,
    /// How long a changed status message stays expanded.
    pub expanded_duration: u32,
    pub online_text: String,
    pub offline_text: String,
    pub reconnecting_text: String,
    /// Whether the renderer applies its built-in styling.
    pub apply_default_theme: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            first_delay: 450,
            second_delay: 1500,
            third_delay: 5000,
            expanded_duration: 2000,
            online_text: "Online".to_string(),
            offline_text: "Connection lost".to_string(),
            reconnecting_text: "Connection lost, trying to reconnect...".to_string(),
            apply_default_theme: true,
        }
    }
}

fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

/// How far a pending load has escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadingBarState {
    #[default]
    Idle,
    First,
    Second,
    Third,
}

impl LoadingBarState {
    pub fn class_name(&self) -> &'static str {
        match self {
            LoadingBarState::Idle => "",
            LoadingBarState::First => "first",
            LoadingBarState::Second => "second",
            LoadingBarState::Third => "third",
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, LoadingBarState::Idle)
    }

    /// Inline style for the progress element.
    pub fn display_style(&self) -> &'static str {
        if self.is_visible() {
            "display: block"
        } else {
            "display: none"
        }
    }
}

/// The boolean display flags of the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndicatorFlags {
    pub offline: bool,
    pub reconnecting: bool,
    pub loading: bool,
    pub expanded: bool,
}

impl IndicatorFlags {
    /// Whether the indicator should be surfaced at all.
    pub fn should_surface(&self) -> bool {
        self.loading || self.offline || self.reconnecting || self.expanded
    }
}

/// A snapshot of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorView {
    pub flags: IndicatorFlags,
    pub loading_bar: LoadingBarState,
    pub message: String,
    pub surfaced: bool,
}

type SharedInner = Rc<RefCell<IndicatorInner>>;
type WeakInner = Weak<RefCell<IndicatorInner>>;

struct IndicatorInner {
    config: IndicatorConfig,
    flags: IndicatorFlags,
    loading_bar: LoadingBarState,
    last_message_state: ConnectionState,
    mounted: bool,
    surfaced: bool,
    timers: TimerSlots,
    surface: Rc<dyn Surface>,
    on_change: Option<Rc<dyn Fn()>>,
}

impl IndicatorInner {
    /// Updates the flags from `state`. Returns `true` when the status message changed.
    fn update_connection_state(&mut self, state: ConnectionState, weak: &WeakInner) -> bool {
        self.flags.offline = state == ConnectionState::ConnectionLost;
        self.flags.reconnecting = state == ConnectionState::Reconnecting;
        self.update_loading(state == ConnectionState::Loading, weak);

        // Loading never announces itself with a message.
        if self.flags.loading {
            return false;
        }

        if state != self.last_message_state {
            self.last_message_state = state;
            return true;
        }

        false
    }

    fn update_loading(&mut self, loading: bool, weak: &WeakInner) {
        self.flags.loading = loading;
        self.loading_bar = LoadingBarState::Idle;

        let stages = [
            (TimerSlot::FirstStage, LoadingBarState::First, self.config.first_delay),
            (TimerSlot::SecondStage, LoadingBarState::Second, self.config.second_delay),
            (TimerSlot::ThirdStage, LoadingBarState::Third, self.config.third_delay),
        ];
        for (slot, stage, delay) in stages {
            let callback = loading.then(|| deferred(weak, move |inner| inner.loading_bar = stage));
            self.timers.rearm(slot, millis(delay), callback);
        }
    }

    fn apply_state_change(&mut self, state: ConnectionState, weak: &WeakInner) {
        let message_changed = self.update_connection_state(state, weak);
        self.flags.expanded = message_changed;

        let collapse = message_changed.then(|| deferred(weak, |inner| inner.flags.expanded = false));
        self.timers
            .rearm(TimerSlot::Collapse, millis(self.config.expanded_duration), collapse);
    }

    /// Returns the visibility to apply, if it differs from the applied one.
    fn sync_surface(&mut self) -> Option<bool> {
        if !self.mounted {
            return None;
        }
        let show = self.flags.should_surface();
        if show == self.surfaced {
            return None;
        }
        self.surfaced = show;
        Some(show)
    }

    fn message(&self) -> &str {
        if self.flags.reconnecting {
            &self.config.reconnecting_text
        } else if self.flags.offline {
            &self.config.offline_text
        } else {
            &self.config.online_text
        }
    }

    fn view(&self) -> IndicatorView {
        IndicatorView {
            flags: self.flags,
            loading_bar: self.loading_bar,
            message: self.message().to_string(),
            surfaced: self.surfaced,
        }
    }
}

/// Wraps a mutation as a timer callback that only runs while the indicator is alive.
fn deferred(weak: &WeakInner, action: impl FnOnce(&mut IndicatorInner) + 'static) -> TimerCallback {
    let weak = weak.clone();
    Box::new(move || mutate(&weak, action))
}

/// Applies `action`, then shows/hides the surface and notifies the renderer.
///
/// The surface and the change callback run after the borrow is released, so they
/// may read the indicator again.
fn mutate(weak: &WeakInner, action: impl FnOnce(&mut IndicatorInner)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };

    let (visibility, changed, surface, on_change) = {
        let mut inner = shared.borrow_mut();
        let before = inner.view();
        action(&mut *inner);
        let visibility = inner.sync_surface();
        let changed = before != inner.view();
        (visibility, changed, inner.surface.clone(), inner.on_change.clone())
    };

    match visibility {
        Some(true) => {
            tracing::trace!("Surfacing connection indicator");
            surface.show();
        }
        Some(false) => {
            tracing::trace!("Hiding connection indicator");
            surface.hide();
        }
        None => {}
    }

    if changed {
        if let Some(on_change) = on_change {
            on_change();
        }
    }
}

/// Derives the visual state of a connection indicator from a [`ConnectionStateStore`].
///
/// Nothing happens until [`ConnectionIndicator::mount`] subscribes to the store.
/// Dropping the indicator unmounts it.
pub struct ConnectionIndicator {
    store: ConnectionStateStore,
    shared: SharedInner,
    listener: StateChangeListener,
}

impl ConnectionIndicator {
    pub fn new(
        store: ConnectionStateStore,
        scheduler: Rc<dyn Scheduler>,
        surface: Rc<dyn Surface>,
        config: IndicatorConfig,
    ) -> Self {
        let shared = Rc::new(RefCell::new(IndicatorInner {
            config,
            flags: IndicatorFlags::default(),
            loading_bar: LoadingBarState::Idle,
            last_message_state: ConnectionState::Connected,
            mounted: false,
            surfaced: false,
            timers: TimerSlots::new(scheduler),
            surface,
            on_change: None,
        }));

        // The store is read live: a nested transition may already have replaced `current`.
        let listener: StateChangeListener = {
            let weak = Rc::downgrade(&shared);
            let store = store.downgrade();
            Rc::new(move |_, _| {
                if let Some(store) = store.upgrade() {
                    let state = store.state();
                    mutate(&weak, |inner| inner.apply_state_change(state, &weak));
                }
            })
        };

        Self {
            store,
            shared,
            listener,
        }
    }

    /// Subscribes to the store and derives the initial flags from its current state.
    pub fn mount(&self) {
        if self.is_mounted() {
            return;
        }
        self.shared.borrow_mut().mounted = true;
        self.store.add_state_change_listener(&self.listener);

        let state = self.store.state();
        let weak = Rc::downgrade(&self.shared);
        mutate(&weak, |inner| {
            inner.flags.expanded = false;
            inner.update_connection_state(state, &weak);
        });
        tracing::debug!(%state, "Connection indicator mounted");
    }

    /// Unsubscribes from the store and cancels every pending timer.
    pub fn unmount(&self) {
        if !self.is_mounted() {
            return;
        }
        self.store.remove_state_change_listener(&self.listener);

        let mut inner = self.shared.borrow_mut();
        inner.mounted = false;
        inner.surfaced = false;
        inner.timers.cancel_all();
        tracing::debug!("Connection indicator unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.borrow().mounted
    }

    /// Registers the callback run after any visible change.
    pub fn set_on_change(&self, on_change: impl Fn() + 'static) {
        self.shared.borrow_mut().on_change = Some(Rc::new(on_change));
    }

    /// Replaces the configuration. New delays apply the next time a timer is armed.
    pub fn set_config(&self, config: IndicatorConfig) {
        let weak = Rc::downgrade(&self.shared);
        mutate(&weak, |inner| inner.config = config);
    }

    pub fn config(&self) -> IndicatorConfig {
        self.shared.borrow().config.clone()
    }

    pub fn flags(&self) -> IndicatorFlags {
        self.shared.borrow().flags
    }

    pub fn loading_bar_state(&self) -> LoadingBarState {
        self.shared.borrow().loading_bar
    }

    pub fn message(&self) -> String {
        self.shared.borrow().message().to_string()
    }

    /// The visibility last applied to the surface.
    pub fn is_surfaced(&self) -> bool {
        self.shared.borrow().surfaced
    }

    pub fn view(&self) -> IndicatorView {
        self.shared.borrow().view()
    }

    pub fn store(&self) -> &ConnectionStateStore {
        &self.store
    }
}

impl Drop for ConnectionIndicator {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ConnectionIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionIndicator")
            .field("store", &self.store)
            .field("view", &self.view())
            .finish()
    }
}
