//! Time source used by the lock loop and the in-memory backend.
//!
//! The lock protocol reads wall-clock time to age markers and bounds its total
//! wait, and sleeps between polls. Both go through [`Clock`] so tests can run
//! multi-hour scenarios without waiting.

use crate::cancel::CancelToken;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// A source of current time that can also put the caller to sleep.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for `duration`, returning early if `cancel` fires.
    fn sleep(&self, duration: Duration, cancel: &CancelToken);
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) {
        if let Ok(duration) = duration.to_std() {
            cancel.wait_timeout(duration);
        }
    }
}

/// A clock that only moves when told to.
///
/// `sleep` advances the clock by the requested duration instead of blocking,
/// and runs the registered tick hook afterwards. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    on_sleep: Arc<Mutex<Option<SleepHook>>>,
}

type SleepHook = Box<dyn FnMut(DateTime<Utc>) + Send>;

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            on_sleep: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Run `hook` with the new time after every `sleep`.
    ///
    /// Tests use this to act as a third party between poll cycles, e.g. to
    /// keep a marker fresh or to cancel the waiting caller.
    pub fn on_sleep<F>(&self, hook: F)
    where
        F: FnMut(DateTime<Utc>) + Send + 'static,
    {
        *self.on_sleep.lock() = Some(Box::new(hook));
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &*self.now.lock())
            .finish_non_exhaustive()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration, _cancel: &CancelToken) {
        self.advance(duration);
        let now = self.now();
        if let Some(hook) = self.on_sleep.lock().as_mut() {
            hook(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn manual_clock_only_moves_on_advance_or_sleep() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), start + Duration::minutes(5));

        clock.sleep(Duration::hours(1), &CancelToken::new());
        assert_eq!(clock.now(), start + Duration::minutes(65));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::starting_now();
        let other = clock.clone();
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), other.now());
    }

    #[test]
    fn manual_clock_runs_sleep_hook() {
        let clock = ManualClock::starting_now();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        clock.on_sleep(move |now| sink.lock().push(now));

        clock.sleep(Duration::seconds(1), &CancelToken::new());
        clock.sleep(Duration::seconds(1), &CancelToken::new());

        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[1], clock.now());
    }

    #[test]
    fn system_clock_sleep_wakes_on_cancel() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let started = Instant::now();
        SystemClock.sleep(Duration::seconds(10), &cancel);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn system_clock_ignores_negative_sleep() {
        let started = Instant::now();
        SystemClock.sleep(Duration::seconds(-5), &CancelToken::new());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}
