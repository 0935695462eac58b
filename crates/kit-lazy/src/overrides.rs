use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Value = Arc<dyn Any + Send + Sync>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static TASK_SCOPES: Vec<Overrides>;
}

thread_local! {
    static THREAD_SCOPES: RefCell<Vec<Overrides>> = const { RefCell::new(Vec::new()) };
}

/// Process-unique key for a lazy value. Zero means "not yet assigned" so
/// the id can be created in a `const` context.
#[derive(Debug)]
pub(crate) struct LazyId(AtomicU64);

impl LazyId {
    pub(crate) const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub(crate) fn get(&self) -> u64 {
        let current = self.0.load(Ordering::Acquire);
        if current != 0 {
            return current;
        }
        let fresh = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        match self.0.compare_exchange(0, fresh, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => fresh,
            Err(existing) => existing,
        }
    }
}

/// A lazy value that can be replaced inside an [`Overrides`] scope.
pub trait Overridable<T> {
    fn override_id(&self) -> u64;
}

/// An immutable set of replacement values for lazy singletons.
///
/// Installed with [`scope`](Self::scope) (async) or
/// [`scope_sync`](Self::scope_sync). Scopes nest; the innermost scope that
/// holds a key wins, and keys it lacks fall through to outer scopes and
/// finally to the global value. The global value is never touched.
///
/// Synchronous scopes are consulted before async ones since they cannot
/// span an `.await`.
///
/// Task-local state does not follow `tokio::spawn`. Capture the active set
/// with [`current`](Self::current) and re-install it in the spawned task.
#[derive(Clone, Default)]
pub struct Overrides {
    values: Arc<HashMap<u64, Value>>,
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides").field("len", &self.values.len()).finish()
    }
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T, L>(mut self, lazy: &L, value: T) -> Self
    where
        T: Send + Sync + 'static,
        L: Overridable<T> + ?Sized,
    {
        Arc::make_mut(&mut self.values).insert(lazy.override_id(), Arc::new(value));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Run `fut` with this set installed for the current task.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        let mut stack = TASK_SCOPES.try_with(|scopes| scopes.clone()).unwrap_or_default();
        stack.push(self);
        TASK_SCOPES.scope(stack, fut).await
    }

    /// Run `f` with this set installed for the current thread.
    pub fn scope_sync<R>(self, f: impl FnOnce() -> R) -> R {
        struct Pop;
        impl Drop for Pop {
            fn drop(&mut self) {
                THREAD_SCOPES.with(|scopes| {
                    scopes.borrow_mut().pop();
                });
            }
        }

        THREAD_SCOPES.with(|scopes| scopes.borrow_mut().push(self));
        let _pop = Pop;
        f()
    }

    /// Every override visible here, flattened into one set.
    pub fn current() -> Self {
        let mut merged: HashMap<u64, Value> = HashMap::new();
        let task = TASK_SCOPES.try_with(|scopes| scopes.clone()).unwrap_or_default();
        let thread = THREAD_SCOPES.with(|scopes| scopes.borrow().clone());
        for scope in task.iter().chain(thread.iter()) {
            for (id, value) in scope.values.iter() {
                merged.insert(*id, Arc::clone(value));
            }
        }
        Self {
            values: Arc::new(merged),
        }
    }

    pub(crate) fn get<T: Send + Sync + 'static>(&self, id: u64) -> Option<Arc<T>> {
        self.values.get(&id).cloned().and_then(|value| value.downcast::<T>().ok())
    }

    pub(crate) fn lookup<T: Send + Sync + 'static>(id: u64) -> Option<Arc<T>> {
        let from_thread = THREAD_SCOPES.with(|scopes| {
            scopes.borrow().iter().rev().find_map(|scope| scope.get::<T>(id))
        });
        if from_thread.is_some() {
            return from_thread;
        }
        TASK_SCOPES
            .try_with(|scopes| scopes.iter().rev().find_map(|scope| scope.get::<T>(id)))
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Key(LazyId);

    impl Overridable<u32> for Key {
        fn override_id(&self) -> u64 {
            self.0.get()
        }
    }

    #[test]
    fn test_ids_are_unique_and_stable() {
        let a = LazyId::new();
        let b = LazyId::new();
        assert_ne!(a.get(), b.get());
        assert_eq!(a.get(), a.get());
        assert_ne!(a.get(), 0);
    }

    #[test]
    fn test_sync_scopes_nest() {
        let a = Key(LazyId::new());
        let b = Key(LazyId::new());
        let outer = Overrides::new().with(&a, 1u32).with(&b, 10u32);
        let inner = Overrides::new().with(&a, 2u32);

        outer.scope_sync(|| {
            assert_eq!(Overrides::lookup::<u32>(a.override_id()).as_deref(), Some(&1));
            inner.scope_sync(|| {
                assert_eq!(Overrides::lookup::<u32>(a.override_id()).as_deref(), Some(&2));
                assert_eq!(Overrides::lookup::<u32>(b.override_id()).as_deref(), Some(&10));
            });
            assert_eq!(Overrides::lookup::<u32>(a.override_id()).as_deref(), Some(&1));
        });
        assert!(Overrides::lookup::<u32>(a.override_id()).is_none());
    }

    #[test]
    fn test_sync_scope_pops_on_panic() {
        let a = Key(LazyId::new());
        let set = Overrides::new().with(&a, 1u32);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            set.scope_sync::<()>(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(Overrides::lookup::<u32>(a.override_id()).is_none());
    }

    #[test]
    fn test_wrong_type_is_ignored() {
        let a = Key(LazyId::new());
        let id = a.override_id();
        let set = Overrides::new().with(&a, 1u32);
        assert!(set.get::<String>(id).is_none());
        assert_eq!(set.get::<u32>(id).as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn test_async_scopes_nest_and_fall_through() {
        let a = Key(LazyId::new());
        let b = Key(LazyId::new());
        let outer = Overrides::new().with(&a, 1u32).with(&b, 10u32);
        let inner = Overrides::new().with(&a, 2u32);

        outer
            .scope(async {
                inner
                    .scope(async {
                        assert_eq!(Overrides::lookup::<u32>(a.override_id()).as_deref(), Some(&2));
                        assert_eq!(Overrides::lookup::<u32>(b.override_id()).as_deref(), Some(&10));
                    })
                    .await;
                assert_eq!(Overrides::lookup::<u32>(a.override_id()).as_deref(), Some(&1));
            })
            .await;
    }

    #[tokio::test]
    async fn test_current_carries_overrides_into_spawned_tasks() {
        let a = Key(LazyId::new());
        let id = a.override_id();
        Overrides::new()
            .with(&a, 5u32)
            .scope(async move {
                let captured = Overrides::current();
                let seen = tokio::spawn(captured.scope(async move { Overrides::lookup::<u32>(id) }))
                    .await
                    .unwrap();
                assert_eq!(seen.as_deref(), Some(&5));
            })
            .await;
    }
}
