use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;

type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// A mutex-guarded map of lazily constructed values.
///
/// The map lock is only held to find a key's slot; construction runs
/// outside it, so different keys initialize in parallel while concurrent
/// callers for the same key share one construction.
pub struct LazyMap<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for LazyMap<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> LazyMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A failed construction is not stored and the next call retries.
    pub fn get_or_try_init<E>(&self, key: K, init: impl FnOnce() -> Result<V, E>) -> Result<Arc<V>, E> {
        let slot = Arc::clone(self.lock().entry(key.clone()).or_default());
        let result = slot.get_or_try_init(|| init().map(Arc::new)).cloned();
        if result.is_err() {
            let mut slots = self.lock();
            if slots
                .get(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &slot) && current.get().is_none())
            {
                slots.remove(&key);
            }
        }
        result
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of initialized entries.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<K, V> fmt::Debug for LazyMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.slots.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("LazyMap").field("slots", &len).finish()
    }
}
