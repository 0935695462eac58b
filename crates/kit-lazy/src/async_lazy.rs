use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::overrides::{LazyId, Overridable, Overrides};

type InitFn<T, E> = Box<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Async counterpart of [`Lazy`](crate::Lazy) for values whose construction
/// awaits (connecting a client, fetching a token).
///
/// Same override and retry semantics: an error leaves the cell empty.
pub struct AsyncLazy<T, E> {
    name: &'static str,
    id: LazyId,
    cell: OnceCell<Arc<T>>,
    init: InitFn<T, E>,
}

impl<T, E> AsyncLazy<T, E> {
    pub fn from_fn<F, Fut>(name: &'static str, init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            name,
            id: LazyId::new(),
            cell: OnceCell::new(),
            init: Box::new(move || Box::pin(init())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub fn peek(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

impl<T, E> AsyncLazy<T, E>
where
    T: Send + Sync + 'static,
    E: fmt::Display,
{
    pub async fn get(&self) -> Result<Arc<T>, E> {
        if let Some(value) = Overrides::lookup::<T>(self.id.get()) {
            return Ok(value);
        }
        self.cell
            .get_or_try_init(|| async {
                match (self.init)().await {
                    Ok(value) => {
                        debug!(name = self.name, "lazy value initialized");
                        Ok(Arc::new(value))
                    }
                    Err(e) => {
                        warn!(name = self.name, error = %e, "lazy initialization failed");
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    pub async fn get_in(&self, overrides: &Overrides) -> Result<Arc<T>, E> {
        if let Some(value) = overrides.get::<T>(self.id.get()) {
            return Ok(value);
        }
        self.get().await
    }
}

impl<T, E> Overridable<T> for AsyncLazy<T, E> {
    fn override_id(&self) -> u64 {
        self.id.get()
    }
}

impl<T: fmt::Debug, E> fmt::Debug for AsyncLazy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLazy")
            .field("name", &self.name)
            .field("value", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_initializes_once_under_contention() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy: Arc<AsyncLazy<u64, String>> = Arc::new(AsyncLazy::from_fn("slow", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(7)
            }
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                tokio::spawn(async move { *lazy.get().await.unwrap() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy: AsyncLazy<&'static str, String> = AsyncLazy::from_fn("flaky", move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err("down".to_string())
                } else {
                    Ok("up")
                }
            }
        });

        assert!(lazy.get().await.is_err());
        assert!(!lazy.is_initialized());
        assert_eq!(*lazy.get().await.unwrap(), "up");
    }

    #[tokio::test]
    async fn test_scoped_override() {
        let lazy: AsyncLazy<u8, String> = AsyncLazy::from_fn("n", || async { Ok(1) });
        let overrides = Overrides::new().with(&lazy, 2);

        let inside = overrides.clone().scope(async { *lazy.get().await.unwrap() }).await;
        assert_eq!(inside, 2);
        assert!(lazy.peek().is_none());
        assert_eq!(*lazy.get_in(&overrides).await.unwrap(), 2);
        assert_eq!(*lazy.get().await.unwrap(), 1);
    }
}
