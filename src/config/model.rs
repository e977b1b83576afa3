// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::exec::default_parallelism;
use crate::types::InputMode;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// max_concurrency = 4
///
/// [tool.shellcheck]
/// cmd = "shellcheck --format=json -"
/// input = "stdin"
///
/// [tool.yamllint]
/// cmd = "yamllint"
/// args = ["-f", "parsable"]
/// input = "arg"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tools from `[tool.<name>]`, keyed by name.
    #[serde(default)]
    pub tool: BTreeMap<String, ToolConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of processes running at once. Defaults to the
    /// machine's available parallelism.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// `[tool.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Executable name, path or full command line.
    pub cmd: String,

    /// Extra arguments appended on every run, after those in `cmd`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Merge stderr into the captured output.
    #[serde(default)]
    pub combine_output: bool,

    /// How input files reach the tool.
    #[serde(default)]
    pub input: InputMode,
}

impl ToolConfig {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args: Vec::new(),
            combine_output: false,
            input: InputMode::default(),
        }
    }
}

/// Validated configuration. Build it through `TryFrom<RawConfigFile>` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub tool: BTreeMap<String, ToolConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, tool: BTreeMap<String, ToolConfig>) -> Self {
        Self { config, tool }
    }

    /// Pool size to use for this config.
    pub fn max_concurrency(&self) -> usize {
        self.config
            .max_concurrency
            .unwrap_or_else(default_parallelism)
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tool.keys().map(String::as_str)
    }
}
