//! # In-memory Store
//!
//! Stand-in for a database. Nothing is persisted, a restart starts empty.
//!
//! ## Requirements
//!
//! - Insertion order is the only ordering guarantee
//! - No identity beyond position, no per-item update or delete
//! - Handlers run on a multi-threaded runtime, so every append/clear/read
//!   goes through one mutex per store
//! - Unbounded, no eviction
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct MemoryStore<T> {
    items: Mutex<Vec<T>>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, item: T) {
        self.lock().push(item);
    }

    /// Copy of every item in insertion order.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        *self.lock() = Vec::new();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
