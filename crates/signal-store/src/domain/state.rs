//! # State Cell
//!
//! Holds the single live state value of a store and notifies observers when
//! it is replaced. The value is never mutated in place: every change swaps in
//! a new `Arc<S>`.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Requirements on a store's state type.
///
/// `Clone` backs `mutate` (which works on a private copy), serde backs
/// persistence and log payloads.
pub trait StoreState: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> StoreState for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Callback run after each replacement with the new value.
pub type Observer<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

/// Current value plus change observers.
pub struct StateCell<S> {
    current: RwLock<Arc<S>>,
    observers: RwLock<Vec<Observer<S>>>,
    version: AtomicU64,
}

impl<S> StateCell<S> {
    pub fn new(initial: Arc<S>) -> Self {
        Self {
            current: RwLock::new(initial),
            observers: RwLock::new(Vec::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Current value.
    pub fn get(&self) -> Arc<S> {
        Arc::clone(&self.current.read())
    }

    /// Number of replacements so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Swap in `next` without notifying anyone. Returns the previous value.
    ///
    /// Pair with [`StateCell::notify`] once the caller has released its own
    /// locks.
    pub fn swap(&self, next: Arc<S>) -> Arc<S> {
        let previous = std::mem::replace(&mut *self.current.write(), next);
        self.version.fetch_add(1, Ordering::AcqRel);
        previous
    }

    /// Run every observer, in registration order, with `value`.
    ///
    /// Observers run on a snapshot of the list with no cell lock held, so an
    /// observer may read the cell or trigger a further replacement.
    pub fn notify(&self, value: &Arc<S>) {
        let observers = self.observers.read().clone();
        for observer in &observers {
            observer(value);
        }
    }

    /// Swap in `next`, then notify observers.
    pub fn replace(&self, next: Arc<S>) -> Arc<S> {
        let previous = self.swap(Arc::clone(&next));
        self.notify(&next);
        previous
    }

    /// Register an observer for future replacements.
    pub fn observe(&self, observer: Observer<S>) {
        self.observers.write().push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}
