#[cfg(any(test, feature = "test-support"))]
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(any(test, feature = "test-support"))]
use std::time::Duration;

#[cfg(any(test, feature = "test-support"))]
use super::{GetElapsed, GetNow};

/// Time only advances when you call [`advance`](MockClock::advance) or
/// [`set`](MockClock::set).
///
/// Clones share the same underlying time, so a clock handed to a cache can
/// still be driven from the test body.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Duration>>,
}

#[cfg(any(test, feature = "test-support"))]
impl MockClock {
    /// Starts at time zero.
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) += duration;
    }

    /// Set the absolute time (vs. relative [`advance`](Self::advance)).
    pub fn set(&self, duration: Duration) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = duration;
    }

    pub fn current_time(&self) -> Duration {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The instant type used by [`MockClock`]: a `Duration` offset from an
/// arbitrary epoch.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(pub Duration);

#[cfg(any(test, feature = "test-support"))]
impl GetNow for MockClock {
    type Instant = MockInstant;

    fn now(&self) -> MockInstant {
        MockInstant(self.current_time())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl GetElapsed for MockClock {
    fn elapsed(&self, since: MockInstant) -> Duration {
        self.current_time().saturating_sub(since.0)
    }
}
