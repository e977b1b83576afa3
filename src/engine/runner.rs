// src/engine/runner.rs

//! Executes a plan on a process pool and gathers the results.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::engine::plan::Invocation;
use crate::errors::{ProcpoolError, Result};
use crate::exec::{CommandOptions, ExternalCommand, ProcessPool};
use crate::fs::FileSystem;
use crate::types::InputMode;

/// Output of one tool on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub tool: String,
    pub file: PathBuf,
    pub output: String,
}

/// A tool whose runs did not all succeed, with its first error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub tool: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Sorted by tool, then file.
    pub reports: Vec<ToolReport>,
    pub failures: Vec<ToolFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve every tool named in `plan` once, run all invocations on `pool`,
/// and wait for them.
///
/// Resolution problems abort before anything runs. Everything else (file
/// read errors, failed processes) is reported per tool in the summary.
pub async fn run_plan(
    pool: &ProcessPool,
    cfg: &ConfigFile,
    plan: &[Invocation],
    fs: &dyn FileSystem,
) -> Result<RunSummary> {
    let commands = resolve_tools(pool, cfg, plan)?;
    let reports: Arc<Mutex<Vec<ToolReport>>> = Arc::new(Mutex::new(Vec::new()));
    let mut failures: BTreeMap<String, String> = BTreeMap::new();

    info!(invocations = plan.len(), tools = commands.len(), capacity = pool.capacity(), "running plan");

    for inv in plan {
        let tool = &cfg.tool[&inv.tool];
        let command = &commands[&inv.tool];

        let (args, stdin) = match tool.input {
            InputMode::Stdin => match fs.read(&inv.file) {
                Ok(bytes) => (tool.args.clone(), bytes),
                Err(err) => {
                    warn!(tool = %inv.tool, file = ?inv.file, error = %err, "could not read input file");
                    failures
                        .entry(inv.tool.clone())
                        .or_insert_with(|| format!("{err:#}"));
                    continue;
                }
            },
            InputMode::Arg => {
                if !fs.is_file(&inv.file) {
                    warn!(tool = %inv.tool, file = ?inv.file, "input is not a file");
                    failures
                        .entry(inv.tool.clone())
                        .or_insert_with(|| format!("input {:?} is not a file", inv.file));
                    continue;
                }
                let mut args = tool.args.clone();
                args.push(inv.file.display().to_string());
                (args, Vec::new())
            }
        };

        let reports = Arc::clone(&reports);
        let tool_name = inv.tool.clone();
        let file = inv.file.clone();

        command.run(args, stdin, move |result| {
            let output = result.with_context(|| format!("running {} on {:?}", tool_name, file))?;
            debug!(tool = %tool_name, file = ?file, bytes = output.len(), "tool finished");
            reports
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(ToolReport {
                    tool: tool_name,
                    file,
                    output: String::from_utf8_lossy(&output).into_owned(),
                });
            Ok(())
        });
    }

    for (name, command) in commands.iter() {
        if let Err(err) = command.wait().await {
            warn!(tool = %name, error = %format!("{err:#}"), "tool failed");
            failures.entry(name.clone()).or_insert_with(|| format!("{err:#}"));
        }
    }
    pool.wait().await;

    let mut reports = std::mem::take(&mut *reports.lock().unwrap_or_else(PoisonError::into_inner));
    reports.sort_by(|a, b| (&a.tool, &a.file).cmp(&(&b.tool, &b.file)));

    Ok(RunSummary {
        reports,
        failures: failures
            .into_iter()
            .map(|(tool, error)| ToolFailure { tool, error })
            .collect(),
    })
}

fn resolve_tools(
    pool: &ProcessPool,
    cfg: &ConfigFile,
    plan: &[Invocation],
) -> Result<BTreeMap<String, ExternalCommand>> {
    let mut commands = BTreeMap::new();

    for inv in plan {
        if commands.contains_key(&inv.tool) {
            continue;
        }
        let tool = cfg
            .tool
            .get(&inv.tool)
            .ok_or_else(|| ProcpoolError::ToolNotFound(inv.tool.clone()))?;
        let options = CommandOptions {
            combine_output: tool.combine_output,
            strict_parse: true,
        };
        let command = pool.command(&tool.cmd, options).map_err(|err| {
            warn!(tool = %inv.tool, cmd = %tool.cmd, error = %err, "could not resolve tool");
            err
        })?;
        debug!(tool = %inv.tool, program = %command.program().display(), "resolved tool");
        commands.insert(inv.tool.clone(), command);
    }

    Ok(commands)
}
