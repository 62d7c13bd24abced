//! Clock trait abstraction for mocking time in tests.
//!
//! - `SystemClock`: delegates to `chrono::Utc::now`
//! - `MockClock`: returns a controllable instant

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Abstraction over the wall clock. Due-ness in this scheduler is calendar
/// time, so the trait deals in `DateTime<Utc>` rather than monotonic
/// instants.
pub trait Clock: Send + Sync + 'static {
    /// Return the current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Live implementation: delegates to the system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for unit tests.
///
/// `now_utc()` returns a fixed time that moves only when you call
/// [`MockClock::advance`] or [`MockClock::set`].
#[derive(Clone)]
pub struct MockClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a mock clock fixed at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(start)) }
    }

    /// Advance the mocked time by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().expect("mock clock poisoned");
        *current += duration;
    }

    /// Jump the mocked time to `to`.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.current.lock().expect("mock clock poisoned") = to;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.current.lock().expect("mock clock poisoned")
    }
}
