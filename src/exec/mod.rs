// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs external tools as subprocesses with `tokio::process::Command`,
//! bounded by a shared pool.
//!
//! - [`execution`] describes one process run and classifies its exit.
//! - [`pool`] owns the concurrency limit and the pool-wide barrier.
//! - [`command`] provides [`ExternalCommand`], a resolved tool handle with
//!   its own failure tracking.
//! - [`resolve`] finds executables on `PATH` and splits command lines.
//! - [`task_group`] and [`wait_group`] are the counting primitives behind
//!   per-command and pool-wide waiting.

pub mod command;
pub mod execution;
pub mod pool;
pub mod resolve;
pub mod task_group;
pub mod wait_group;

pub use command::{CommandOptions, ExternalCommand};
pub use execution::Execution;
pub use pool::{ProcessPool, default_parallelism};
pub use resolve::{resolve_command, split_command_line};
