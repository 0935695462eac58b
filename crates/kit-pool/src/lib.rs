//! Bounded background worker pool.
//!
//! ```ignore
//! let pool = WorkerPool::new(PoolConfig::new("fetch").with_max_workers(8))?;
//!
//! let mut group = pool.group();
//! for url in urls {
//!     group.submit(fetch(url)).await?;
//! }
//! let pages = group.wait().await?;
//!
//! pool.stop_and_wait().await;
//! ```

mod config;
mod error;
mod pool;
mod task;

pub use config::{DEFAULT_CAPACITY, PoolConfig};
pub use error::{PoolError, TaskError};
pub use pool::{PoolMetrics, WorkerPool};
pub use task::{TaskGroup, TaskHandle};
