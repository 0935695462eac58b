use std::time::{Duration, Instant};

use super::{GetElapsed, GetNow};

/// Wall-clock time via `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GetNow for SystemClock {
    type Instant = Instant;

    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl GetElapsed for SystemClock {
    #[inline]
    fn elapsed(&self, since: Instant) -> Duration {
        since.elapsed()
    }
}
