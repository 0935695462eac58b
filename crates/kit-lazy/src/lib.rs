//! Lazily initialized singletons.
//!
//! | Type | Init | Backing |
//! |------|------|---------|
//! | [`Lazy`] | sync, `const fn new` or closure | `once_cell::sync::OnceCell` |
//! | [`AsyncLazy`] | async closure | `tokio::sync::OnceCell` |
//! | [`LazyMap`] | per key | `Mutex<HashMap>` of cells |
//!
//! Any `Lazy` or `AsyncLazy` can be replaced for the duration of a scope
//! with [`Overrides`], which is how tests swap a process-wide client for a
//! fake without touching global state.
//!
//! ```ignore
//! static CLIENT: Lazy<Client, Error> = Lazy::new("client", Client::from_env);
//!
//! Overrides::new()
//!     .with(&CLIENT, fake_client())
//!     .scope(async { run().await })
//!     .await;
//! ```

mod async_lazy;
mod lazy;
mod map;
mod overrides;

pub use async_lazy::AsyncLazy;
pub use lazy::Lazy;
pub use map::LazyMap;
pub use overrides::{Overridable, Overrides};
