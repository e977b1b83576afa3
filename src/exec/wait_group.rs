// src/exec/wait_group.rs

//! Reusable completion barrier.
//!
//! A [`WaitGroup`] counts in-flight work. [`WaitGroup::add`] hands out a
//! [`WaitGuard`] that decrements the count when dropped, so a worker that
//! panics or returns early still signals completion. Waiting returns as soon
//! as the count is observed at zero; the group can be reused afterwards.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct WaitGroup {
    count: Arc<watch::Sender<usize>>,
}

impl WaitGroup {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0usize);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Register one unit of pending work.
    pub fn add(&self) -> WaitGuard {
        self.count.send_modify(|n| *n += 1);
        WaitGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Number of units registered but not yet completed.
    pub fn pending(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until every registered unit has completed.
    pub async fn wait(&self) {
        let mut rx = self.count.subscribe();
        rx.wait_for(|n| *n == 0).await.ok();
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one unit of a [`WaitGroup`] as done when dropped.
#[derive(Debug)]
pub struct WaitGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| {
            debug_assert!(*n > 0, "wait group count went negative");
            *n = n.saturating_sub(1);
        });
    }
}
