// src/engine/plan.rs

//! Which tool runs on which file.

use std::path::PathBuf;

use crate::config::ConfigFile;
use crate::errors::{ProcpoolError, Result};

/// One tool run on one input file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Invocation {
    pub tool: String,
    pub file: PathBuf,
}

/// Cross every selected tool with every file.
///
/// An empty `selected` means "all tools in the config". Tools are visited in
/// config (name) order, files in the order given.
pub fn build_plan(
    cfg: &ConfigFile,
    selected: &[String],
    files: &[PathBuf],
) -> Result<Vec<Invocation>> {
    if files.is_empty() {
        return Err(ProcpoolError::Config(
            "no input files given".to_string(),
        ));
    }

    let tools: Vec<&str> = if selected.is_empty() {
        cfg.tool_names().collect()
    } else {
        for name in selected {
            if !cfg.tool.contains_key(name) {
                return Err(ProcpoolError::ToolNotFound(name.clone()));
            }
        }
        cfg.tool_names()
            .filter(|name| selected.iter().any(|s| s == name))
            .collect()
    };

    let plan = tools
        .into_iter()
        .flat_map(|tool| {
            files.iter().map(move |file| Invocation {
                tool: tool.to_string(),
                file: file.clone(),
            })
        })
        .collect();

    Ok(plan)
}
