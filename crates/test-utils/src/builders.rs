#![allow(dead_code)]

use std::collections::BTreeMap;
use procpool::config::{ConfigFile, ConfigSection, RawConfigFile, ToolConfig};
use procpool::types::InputMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                tool: BTreeMap::new(),
            },
        }
    }

    pub fn with_tool(mut self, name: &str, tool: ToolConfig) -> Self {
        self.config.tool.insert(name.to_string(), tool);
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.config.max_concurrency = Some(n);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ToolConfig`.
pub struct ToolConfigBuilder {
    tool: ToolConfig,
}

impl ToolConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            tool: ToolConfig::new(cmd),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.tool.args.push(arg.to_string());
        self
    }

    pub fn combine_output(mut self, val: bool) -> Self {
        self.tool.combine_output = val;
        self
    }

    pub fn input(mut self, mode: InputMode) -> Self {
        self.tool.input = mode;
        self
    }

    pub fn build(self) -> ToolConfig {
        self.tool
    }
}
