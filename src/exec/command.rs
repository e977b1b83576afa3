// src/exec/command.rs

//! Reusable handle for one external tool.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::ExecError;

use super::execution::Execution;
use super::pool::ProcessPool;
use super::task_group::TaskGroup;

/// Options for [`ProcessPool::command`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Merge stderr into the output handed to callbacks.
    pub combine_output: bool,
    /// Report an unparsable command line as such instead of as "not found".
    pub strict_parse: bool,
}

impl CommandOptions {
    pub fn combined() -> Self {
        Self {
            combine_output: true,
            ..Self::default()
        }
    }
}

/// A resolved executable with fixed leading arguments, bound to a pool.
///
/// Every [`ExternalCommand::run`] schedules one process on the pool.
/// [`ExternalCommand::wait`] only waits for runs issued through this handle
/// (or its clones), so several tools can share a pool and still be checked
/// for failure separately.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pool: ProcessPool,
    program: PathBuf,
    args: Vec<String>,
    combine_output: bool,
    group: TaskGroup,
}

impl ExternalCommand {
    /// Build a handle from an already resolved program. No lookup happens;
    /// a bad path shows up as a spawn error on the first run.
    pub fn new(
        pool: ProcessPool,
        program: impl Into<PathBuf>,
        args: Vec<String>,
        combine_output: bool,
    ) -> Self {
        Self {
            pool,
            program: program.into(),
            args,
            combine_output,
            group: TaskGroup::new(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments placed before the per-run ones.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn combine_output(&self) -> bool {
        self.combine_output
    }

    /// Runs of this handle that have not finished yet.
    pub fn pending(&self) -> usize {
        self.group.pending()
    }

    /// Schedule one run with `args` appended to the fixed arguments and
    /// `stdin` written to the process. Returns without waiting.
    ///
    /// `callback` receives the captured output or the run's error, and runs
    /// on a pool worker. Returning an error from it fails this handle's
    /// [`ExternalCommand::wait`].
    pub fn run<I, S, F>(&self, args: I, stdin: impl Into<Vec<u8>>, callback: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(Result<Vec<u8>, ExecError>) -> anyhow::Result<()> + Send + 'static,
    {
        let all_args: Vec<String> = self
            .args
            .iter()
            .cloned()
            .chain(args.into_iter().map(Into::into))
            .collect();

        debug!(program = %self.program.display(), pending = self.pending(), "queueing command run");

        let exec = Execution::new(self.program.clone(), all_args, stdin, self.combine_output);
        self.pool.schedule(&self.group, exec, callback);
    }

    /// Wait for this handle's runs and return the first failure among them.
    /// Once a run has failed, every later wait on this handle or its clones
    /// reports that failure.
    pub async fn wait(&self) -> anyhow::Result<()> {
        self.group.wait().await
    }

    /// Blocking version of [`ExternalCommand::wait`] for threads outside the
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async context.
    pub fn wait_blocking(&self) -> anyhow::Result<()> {
        let group = self.group.clone();
        self.pool.runtime().block_on(async move { group.wait().await })
    }
}
