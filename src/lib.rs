// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, RawConfigFile, ToolConfig, load_and_validate};
use crate::engine::{Invocation, RunSummary, build_plan, run_plan};
use crate::exec::ProcessPool;
use crate::fs::RealFileSystem;

/// Name of the tool defined by `--command`.
pub const AD_HOC_TOOL: &str = "command";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or an ad-hoc `--command` tool)
/// - the run plan
/// - the process pool and the runner
/// - printing reports
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let plan = build_plan(&cfg, &args.tools, &args.files)?;

    if args.dry_run {
        print_dry_run(&cfg, &plan);
        return Ok(());
    }

    let jobs = args.jobs.unwrap_or_else(|| cfg.max_concurrency());
    let pool = ProcessPool::new(jobs);
    info!(jobs = pool.capacity(), invocations = plan.len(), "starting run");

    let summary = run_plan(&pool, &cfg, &plan, &RealFileSystem).await?;
    print_summary(&summary)?;

    if !summary.is_success() {
        bail!("{} tool(s) failed", summary.failures.len());
    }
    Ok(())
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let Some(cmd) = &args.command else {
        let path = PathBuf::from(&args.config);
        return load_and_validate(&path)
            .with_context(|| format!("loading config {}", path.display()));
    };

    let mut raw = RawConfigFile::default();
    let mut tool = ToolConfig::new(cmd.clone());
    tool.combine_output = args.combine_output;
    raw.tool.insert(AD_HOC_TOOL.to_string(), tool);
    Ok(ConfigFile::try_from(raw)?)
}

/// Print every report to stdout and every failure to stderr.
fn print_summary(summary: &RunSummary) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for report in &summary.reports {
        writeln!(out, "== {}: {} ==", report.tool, report.file.display())?;
        out.write_all(report.output.as_bytes())?;
        if !report.output.is_empty() && !report.output.ends_with('\n') {
            writeln!(out)?;
        }
    }
    out.flush()?;

    for failure in &summary.failures {
        eprintln!("{} failed: {}", failure.tool, failure.error);
    }
    Ok(())
}

fn print_dry_run(cfg: &ConfigFile, plan: &[Invocation]) {
    println!("procpool dry-run");
    println!("  max_concurrency = {}", cfg.max_concurrency());
    println!();

    println!("tools ({}):", cfg.tool.len());
    for (name, tool) in cfg.tool.iter() {
        println!("  - {name}");
        println!("      cmd: {}", tool.cmd);
        if !tool.args.is_empty() {
            println!("      args: {:?}", tool.args);
        }
        println!("      input: {:?}", tool.input);
        if tool.combine_output {
            println!("      combine_output: true");
        }
    }
    println!();

    println!("invocations ({}):", plan.len());
    for inv in plan {
        println!("  {} <- {}", inv.tool, inv.file.display());
    }

    debug!("dry-run complete (no execution)");
}
