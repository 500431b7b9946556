//! Cancelable delayed callbacks.
//!
//! The indicator never talks to a timer API directly. It goes through a [`Scheduler`],
//! which the frontend implements on top of `gloo-timers` and the tests implement
//! with a virtual clock.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A callback run once when its timer fires.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Something that can run a callback after a delay.
pub trait Scheduler {
    /// Schedules `callback` to run once after `delay`.
    ///
    /// Canceling or dropping the returned handle before the delay elapses prevents the
    /// callback from running.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancelation token for a scheduled callback. Dropping it cancels the timer.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// The purpose of a timer owned by the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    FirstStage,
    SecondStage,
    ThirdStage,
    Collapse,
}

impl TimerSlot {
    pub const ALL: [TimerSlot; 4] = [
        TimerSlot::FirstStage,
        TimerSlot::SecondStage,
        TimerSlot::ThirdStage,
        TimerSlot::Collapse,
    ];
}

/// At most one pending timer per [`TimerSlot`].
pub struct TimerSlots {
    scheduler: Rc<dyn Scheduler>,
    handles: HashMap<TimerSlot, TimerHandle>,
}

impl TimerSlots {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            handles: HashMap::new(),
        }
    }

    /// Cancels whatever is pending in `slot`, then arms `callback` if one is given.
    pub fn rearm(&mut self, slot: TimerSlot, delay: Duration, callback: Option<TimerCallback>) {
        if let Some(previous) = self.handles.remove(&slot) {
            previous.cancel();
        }
        if let Some(callback) = callback {
            let handle = self.scheduler.schedule(delay, callback);
            self.handles.insert(slot, handle);
        }
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        self.rearm(slot, Duration::ZERO, None);
    }

    pub fn cancel_all(&mut self) {
        for slot in TimerSlot::ALL {
            self.cancel(slot);
        }
    }

    /// Whether a handle is held for `slot`. A held handle may already have fired.
    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.handles.contains_key(&slot)
    }
}

#[cfg(test)]
pub(crate) use manual::ManualScheduler;

#[cfg(test)]
mod manual {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;
    use std::time::Duration;

    use super::{Scheduler, TimerCallback, TimerHandle};

    #[derive(Default)]
    struct Clock {
        now: Duration,
        next_id: u64,
        pending: BTreeMap<(Duration, u64), TimerCallback>,
    }

    /// Virtual-clock scheduler: nothing fires until [`ManualScheduler::advance`] is called.
    #[derive(Clone, Default)]
    pub(crate) struct ManualScheduler {
        clock: Rc<RefCell<Clock>>,
    }

    impl ManualScheduler {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn pending(&self) -> usize {
            self.clock.borrow().pending.len()
        }

        /// Moves the clock forward, running due callbacks in deadline order.
        pub(crate) fn advance(&self, by: Duration) {
            let target = self.clock.borrow().now + by;
            loop {
                let due = {
                    let mut clock = self.clock.borrow_mut();
                    let next = clock.pending.keys().next().copied();
                    match next {
                        Some(key) if key.0 <= target => {
                            clock.now = key.0;
                            clock.pending.remove(&key)
                        }
                        _ => None,
                    }
                };
                match due {
                    Some(callback) => callback(),
                    None => break,
                }
            }
            self.clock.borrow_mut().now = target;
        }

        pub(crate) fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
            let key = {
                let mut clock = self.clock.borrow_mut();
                let key = (clock.now + delay, clock.next_id);
                clock.next_id += 1;
                clock.pending.insert(key, callback);
                key
            };
            let clock = Rc::downgrade(&self.clock);
            TimerHandle::new(move || {
                if let Some(clock) = clock.upgrade() {
                    clock.borrow_mut().pending.remove(&key);
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> TimerCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(name)) as TimerCallback
        };
        (log, make)
    }

    #[test]
    fn test_callbacks_fire_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        let _late = scheduler.schedule(Duration::from_millis(300), make("late"));
        let _early = scheduler.schedule(Duration::from_millis(100), make("early"));

        scheduler.advance_ms(99);
        assert!(log.borrow().is_empty());

        scheduler.advance_ms(1);
        assert_eq!(*log.borrow(), vec!["early"]);

        scheduler.advance_ms(500);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        let handle = scheduler.schedule(Duration::from_millis(10), make("never"));
        drop(handle);
        scheduler.advance_ms(100);

        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_rearm_replaces_pending_timer() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let mut slots = TimerSlots::new(Rc::new(scheduler.clone()));

        slots.rearm(TimerSlot::FirstStage, Duration::from_millis(50), Some(make("first")));
        scheduler.advance_ms(40);
        slots.rearm(TimerSlot::FirstStage, Duration::from_millis(50), Some(make("second")));

        scheduler.advance_ms(40);
        assert!(log.borrow().is_empty());

        scheduler.advance_ms(10);
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn test_rearm_without_callback_disarms() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let mut slots = TimerSlots::new(Rc::new(scheduler.clone()));

        slots.rearm(TimerSlot::Collapse, Duration::from_millis(20), Some(make("collapse")));
        assert!(slots.is_armed(TimerSlot::Collapse));

        slots.rearm(TimerSlot::Collapse, Duration::from_millis(20), None);
        assert!(!slots.is_armed(TimerSlot::Collapse));

        scheduler.advance_ms(100);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_slots_are_independent() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let mut slots = TimerSlots::new(Rc::new(scheduler.clone()));

        slots.rearm(TimerSlot::FirstStage, Duration::from_millis(10), Some(make("first")));
        slots.rearm(TimerSlot::SecondStage, Duration::from_millis(20), Some(make("second")));
        slots.cancel(TimerSlot::FirstStage);

        scheduler.advance_ms(30);
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn test_cancel_all() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let mut slots = TimerSlots::new(Rc::new(scheduler.clone()));

        for slot in TimerSlot::ALL {
            slots.rearm(slot, Duration::from_millis(10), Some(make("fired")));
        }
        assert_eq!(scheduler.pending(), 4);

        slots.cancel_all();
        scheduler.advance_ms(10);

        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending(), 0);
    }
}
