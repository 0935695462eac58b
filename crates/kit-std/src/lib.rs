//! Zero-cost abstractions over `std` shared by the `kit-*` crates.
//!
//! # Quick Start
//!
//! | Concern | Trait(s) | Production | Test |
//! |---------|----------|------------|------|
//! | Env vars | [`ReadEnv`] | [`SystemEnv`] | [`InMemoryEnv`]* |
//! | Filesystem | [`ReadFile`] | [`SystemFs`] | [`MemFs`]* |
//! | Time | [`GetNow`], [`GetElapsed`] | [`SystemClock`] | [`MockClock`]* |
//!
//! *Available with `#[cfg(test)]` or the `"test-support"` feature.
//!
//! # Thread Safety
//!
//! Production types are zero-sized and trivially `Send + Sync`. The test
//! doubles are `Send + Sync` as well so they can be shared with tasks on a
//! multi-threaded tokio runtime:
//!
//! | Test type | Backing |
//! |-----------|---------|
//! | [`InMemoryEnv`] | `RwLock<HashMap>` |
//! | [`MemFs`] | `RwLock<HashMap>` |
//! | [`MockClock`] | `Arc<Mutex<Duration>>` |

pub mod env;
pub mod fs;
pub mod time;

#[cfg(any(test, feature = "test-support"))]
pub use env::InMemoryEnv;
pub use env::{ReadEnv, SystemEnv};
#[cfg(any(test, feature = "test-support"))]
pub use fs::MemFs;
pub use fs::{ReadFile, SystemFs};
#[cfg(any(test, feature = "test-support"))]
pub use time::{MockClock, MockInstant};
pub use time::{GetElapsed, GetNow, SystemClock};
