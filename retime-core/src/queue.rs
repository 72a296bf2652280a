//! Bounded blocking queues connecting pipeline stages.
//!
//! Each queue has exactly one producer stage and one consumer stage. `push`
//! blocks while the queue is at capacity, giving the pipeline backpressure;
//! `pop` blocks while the queue is empty and not yet finished. A finished and
//! drained queue is the only end-of-stream signal a consumer ever sees.
//!
//! Items still queued when the queue is dropped are dropped with it, so every
//! pushed item is either popped exactly once or released during teardown.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

struct Inner<T> {
    items: VecDeque<T>,
    finished: bool,
}

/// A bounded, blocking, single-producer/single-consumer FIFO.
pub struct Queue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> Queue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be nonzero");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                finished: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Push an item, blocking while the queue is full.
    ///
    /// Returns `false` if the queue was finished, in which case the item is
    /// dropped: a consumer that has already stopped will never pop it.
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        while inner.items.len() >= self.capacity && !inner.finished {
            self.not_full.wait(&mut inner);
        }
        if inner.finished {
            return false;
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        true
    }

    /// Pop the next item, blocking until one is available.
    ///
    /// Returns `None` once the queue is finished and fully drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        while inner.items.is_empty() && !inner.finished {
            self.not_empty.wait(&mut inner);
        }
        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Mark the queue finished, waking all waiters. Idempotent.
    ///
    /// Remaining items stay poppable; subsequent pushes are refused.
    pub fn finish(&self) {
        let mut inner = self.inner.lock();
        inner.finished = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Check if the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Check if the queue has been finished.
    pub fn is_finished(&self) -> bool {
        self.inner.lock().finished
    }

    /// The maximum number of items the queue holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
