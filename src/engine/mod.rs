// src/engine/mod.rs

//! Runs configured tools over input files.
//!
//! - [`plan`] decides which tool runs on which file (pure).
//! - [`runner`] resolves each tool once, runs the plan on a
//!   [`ProcessPool`](crate::exec::ProcessPool) and collects reports.

pub mod plan;
pub mod runner;

pub use plan::{Invocation, build_plan};
pub use runner::{RunSummary, ToolFailure, ToolReport, run_plan};
