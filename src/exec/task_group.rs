// src/exec/task_group.rs

//! Per-command failure tracker.
//!
//! Every [`ExternalCommand`](super::ExternalCommand) owns one [`TaskGroup`].
//! It counts that command's in-flight invocations and keeps the first error
//! any of them reported, independently of the pool-wide barrier. The first
//! error is sticky: every waiter, concurrent or later, sees it.

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Error;
use tracing::warn;

use super::wait_group::{WaitGroup, WaitGuard};

#[derive(Debug, Clone, Default)]
pub struct TaskGroup {
    inner: Arc<GroupInner>,
}

#[derive(Debug, Default)]
struct GroupInner {
    pending: WaitGroup,
    first_error: Mutex<Option<Arc<Error>>>,
    suppressed: AtomicUsize,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one invocation.
    pub fn add(&self) -> WaitGuard {
        self.inner.pending.add()
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.pending()
    }

    /// Record a failure. The first one is kept for [`TaskGroup::wait`]; later
    /// ones are logged and counted.
    pub fn record(&self, err: Error) {
        let mut slot = self
            .inner
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if slot.is_none() {
            *slot = Some(Arc::new(err));
        } else {
            self.inner.suppressed.fetch_add(1, Ordering::Relaxed);
            warn!(error = %format!("{err:#}"), "additional failure in command group");
        }
    }

    /// Wait for all registered invocations, then return the first recorded
    /// error, if any.
    pub async fn wait(&self) -> anyhow::Result<()> {
        self.inner.pending.wait().await;
        self.first_error()
    }

    fn first_error(&self) -> anyhow::Result<()> {
        let first = self
            .inner
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match first {
            Some(err) => {
                let suppressed = self.inner.suppressed.load(Ordering::Relaxed);
                if suppressed > 0 {
                    warn!(
                        suppressed,
                        first = %err,
                        "command group had more failures than the one reported"
                    );
                }
                Err(Error::new(SharedError(err)))
            }
            None => Ok(()),
        }
    }
}

/// A recorded error handed out to one of possibly many waiters. Displays as
/// the recorded error and exposes the same cause chain.
#[derive(Debug)]
struct SharedError(Arc<Error>);

impl fmt::Display for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for SharedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}
