// src/exec/pool.rs

//! Bounded pool for running external processes.
//!
//! Running too many processes at once exhausts file descriptors and can
//! make process creation hang on some platforms, so every run has to get a
//! slot from the pool's semaphore before it spawns. The slot is given back as
//! soon as the process has exited, before the callback runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::errors::{ExecError, ResolveError};

use super::command::{CommandOptions, ExternalCommand};
use super::execution::Execution;
use super::resolve::resolve_command;
use super::task_group::TaskGroup;
use super::wait_group::WaitGroup;

/// Shared handle to a process pool. Clones refer to the same pool.
#[derive(Debug, Clone)]
pub struct ProcessPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    runtime: Handle,
    slots: Arc<Semaphore>,
    capacity: usize,
    in_flight: WaitGroup,
}

impl ProcessPool {
    /// Create a pool running at most `max_concurrency` processes at once,
    /// on the current tokio runtime. A capacity of 0 is raised to 1.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use
    /// [`ProcessPool::with_runtime`] there.
    pub fn new(max_concurrency: usize) -> Self {
        Self::with_runtime(Handle::current(), max_concurrency)
    }

    pub fn with_runtime(runtime: Handle, max_concurrency: usize) -> Self {
        let capacity = if max_concurrency == 0 {
            warn!("process pool capacity of 0 requested; using 1");
            1
        } else {
            max_concurrency
        };

        debug!(capacity, "created process pool");

        Self {
            inner: Arc::new(PoolInner {
                runtime,
                slots: Arc::new(Semaphore::new(capacity)),
                capacity,
                in_flight: WaitGroup::new(),
            }),
        }
    }

    /// Pool sized to the machine's available parallelism.
    pub fn with_default_parallelism() -> Self {
        Self::new(default_parallelism())
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    /// Scheduled runs whose callback has not returned yet.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.pending()
    }

    /// Resolve `command` and build a handle for it on this pool.
    pub fn command(
        &self,
        command: &str,
        options: CommandOptions,
    ) -> Result<ExternalCommand, ResolveError> {
        let (program, args) = resolve_command(command, options.strict_parse)?;
        Ok(ExternalCommand::new(
            self.clone(),
            program,
            args,
            options.combine_output,
        ))
    }

    /// Stop admitting processes. Runs still waiting for a slot fail with
    /// [`ExecError::Admission`]; running processes are not touched.
    pub fn close(&self) {
        debug!("closing process pool");
        self.inner.slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.slots.is_closed()
    }

    /// Run `exec` in the background under `group`.
    ///
    /// The callback runs on the worker task. An error it returns, or a panic
    /// inside it, is recorded in `group`. Slot acquisition failures are
    /// recorded directly and the callback is not called.
    pub(crate) fn schedule<F>(&self, group: &TaskGroup, exec: Execution, callback: F)
    where
        F: FnOnce(Result<Vec<u8>, ExecError>) -> anyhow::Result<()> + Send + 'static,
    {
        let pool_done = self.inner.in_flight.add();
        let group_done = group.add();
        let group = group.clone();
        let slots = Arc::clone(&self.inner.slots);

        debug!(program = %exec.program.display(), args = ?exec.args, "scheduling process");

        self.inner.runtime.spawn(async move {
            let _pool_done = pool_done;
            let _group_done = group_done;
            let program = exec.program_name();

            let permit = match slots.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let err = ExecError::Admission { program };
                    warn!(error = %err, "process slot unavailable");
                    group.record(err.into());
                    return;
                }
            };

            let result = exec.run().await;
            drop(permit);

            if let Err(err) = &result {
                debug!(program = %program, error = %err, "process run failed");
            }

            match panic::catch_unwind(AssertUnwindSafe(|| callback(result))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(program = %program, error = %format!("{err:#}"), "process callback reported failure");
                    group.record(err);
                }
                Err(payload) => {
                    let msg = panic_message(payload.as_ref());
                    warn!(program = %program, panic = %msg, "process callback panicked");
                    group.record(anyhow!("callback for {program} panicked: {msg}"));
                }
            }
        });
    }

    /// Wait until every run scheduled on this pool, by any command, has
    /// finished its callback.
    pub async fn wait(&self) {
        self.inner.in_flight.wait().await;
    }

    /// Blocking version of [`ProcessPool::wait`] for threads outside the
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async context.
    pub fn wait_blocking(&self) {
        self.inner.runtime.block_on(self.wait());
    }
}

/// Recommended pool size.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
