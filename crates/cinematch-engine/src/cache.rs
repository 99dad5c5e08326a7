//! Process-lifetime memoization with request coalescing.
//!
//! Each key owns an async once-cell. The first caller for a key runs the
//! initializer; concurrent callers for the same key wait on that cell and
//! receive the same value, so identical in-flight requests cost one
//! computation and one set of upstream calls. A failed initializer leaves
//! the cell empty and the next caller tries again.
//!
//! Entries are never evicted or invalidated.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// A string-keyed single-flight cache.
pub struct SingleFlightCache<V> {
    cells: Mutex<HashMap<String, Arc<OnceCell<V>>>>,
}

impl<V> SingleFlightCache<V>
where
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`, if one has been stored.
    pub fn get(&self, key: &str) -> Option<V> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached value for `key`, or run `init` to produce it.
    ///
    /// At most one `init` runs per key at a time; other callers wait for
    /// its result. Errors are returned to every waiter that observed the
    /// failing attempt and are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.cell(key);
        cell.get_or_try_init(init).await.cloned()
    }

    /// Store `value` under `key` unless a value is already present.
    ///
    /// Returns `false` when the key was already filled.
    pub fn insert(&self, key: &str, value: V) -> bool {
        self.cell(key).set(value).is_ok()
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: &str) -> Arc<OnceCell<V>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key.to_string()).or_default())
    }
}

impl<V> Default for SingleFlightCache<V>
where
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for SingleFlightCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self
            .cells
            .lock()
            .map(|cells| cells.len())
            .unwrap_or_default();
        f.debug_struct("SingleFlightCache")
            .field("keys", &keys)
            .finish()
    }
}
