//! Zero-cost abstraction for monotonic time.
//!
//! # Examples
//!
//! ```
//! use kit_std::time::{GetNow, GetElapsed, SystemClock};
//! use std::time::Duration;
//!
//! fn is_stale<C: GetNow + GetElapsed>(clock: &C, fetched_at: C::Instant, ttl: Duration) -> bool {
//!     clock.elapsed(fetched_at) >= ttl
//! }
//!
//! let clock = SystemClock;
//! let fetched_at = clock.now();
//! let stale = is_stale(&clock, fetched_at, Duration::from_secs(300));
//! ```
//!
//! ```ignore
//! use kit_std::time::{GetNow, GetElapsed, MockClock};
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! let fetched_at = clock.now();
//!
//! clock.advance(Duration::from_secs(299));
//! assert!(!is_stale(&clock, fetched_at, Duration::from_secs(300)));
//!
//! clock.advance(Duration::from_secs(1));
//! assert!(is_stale(&clock, fetched_at, Duration::from_secs(300)));
//! ```

mod get_elapsed;
mod get_now;
mod mock;
mod system;

pub use get_elapsed::GetElapsed;
pub use get_now::GetNow;
#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockClock, MockInstant};
pub use system::SystemClock;
