//! Cooperative cancellation: an atomic stop flag plus node/deadline
//! counters the search polls at node boundaries. Shared between the
//! worker thread (read+write) and the timer thread (write-only).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub struct SearchControl {
    stop: AtomicBool,
    node_limit: AtomicU64,
    node_count: AtomicU64,
    start: std::sync::Mutex<Option<Instant>>,
}

impl SearchControl {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(SearchControl {
            stop: AtomicBool::new(false),
            node_limit: AtomicU64::new(0),
            node_count: AtomicU64::new(0),
            start: std::sync::Mutex::new(None),
        })
    }

    pub fn reset(&self, start: Instant, node_limit: u64) {
        self.stop.store(false, Ordering::SeqCst);
        self.node_limit.store(node_limit, Ordering::SeqCst);
        self.node_count.store(0, Ordering::SeqCst);
        *self.start.lock().unwrap() = Some(start);
    }

    /// Rebase the elapsed-time clock without touching node counts or the
    /// stop flag -- used by `ponderhit`, which starts a real clock on a
    /// search that has already been running (and counting nodes) for a
    /// while as a ponder search.
    pub fn restart_clock(&self, start: Instant) {
        *self.start.lock().unwrap() = Some(start);
    }

    pub fn set_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Increments the node count and returns whether the node limit was
    /// just crossed (which also raises the stop flag).
    pub fn node_visited(&self) -> bool {
        let n = self.node_count.fetch_add(1, Ordering::Relaxed) + 1;
        let limit = self.node_limit.load(Ordering::Relaxed);
        if limit > 0 && n >= limit {
            self.stop.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        match *self.start.lock().unwrap() {
            Some(start) => start.elapsed().as_millis() as u64,
            None => 0,
        }
    }
}
