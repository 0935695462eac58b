//! Zero-cost abstraction for environment variable access.
//!
//! # Examples
//!
//! ```
//! use kit_std::env::{ReadEnv, SystemEnv};
//!
//! fn listen_addr<E: ReadEnv>(env: &E) -> String {
//!     env.var("LISTEN_ADDR")
//!         .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
//! }
//!
//! let addr = listen_addr(&SystemEnv);
//! ```
//!
//! ```ignore
//! use kit_std::env::{ReadEnv, InMemoryEnv};
//!
//! let env = InMemoryEnv::new();
//! env.set("LISTEN_ADDR", "0.0.0.0:9000"); // takes &self
//!
//! assert_eq!(listen_addr(&env), "0.0.0.0:9000");
//! ```

mod in_memory;
mod read_env;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryEnv;
pub use read_env::ReadEnv;
pub use system::SystemEnv;
