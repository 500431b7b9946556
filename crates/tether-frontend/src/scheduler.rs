use std::time::Duration;

use gloo_timers::callback::Timeout;
use tether::timer::{Scheduler, TimerCallback, TimerHandle};

/// Runs indicator timers on the browser's `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, callback);

        // Dropping a `Timeout` clears it.
        TimerHandle::new(move || drop(timeout))
    }
}
