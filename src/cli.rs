// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `procpool`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procpool",
    version,
    about = "Run external checkers over files with a bounded number of processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Procpool.toml` in the current working directory. Ignored
    /// when `--command` is given.
    #[arg(long, value_name = "PATH", default_value = "Procpool.toml")]
    pub config: String,

    /// Run this command line on every file instead of the configured tools.
    #[arg(long, value_name = "CMDLINE")]
    pub command: Option<String>,

    /// With `--command`: merge stderr into the reported output.
    #[arg(long)]
    pub combine_output: bool,

    /// Maximum number of processes at once. Overrides `[config].max_concurrency`.
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Only run these tools (repeatable). Default: all configured tools.
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCPOOL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print which tool would run on which file, without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Input files.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let args = CliArgs::try_parse_from([
            "procpool", "--jobs", "3", "--tool", "a", "--tool", "b", "--dry-run", "x.sh", "y.sh",
        ])
        .unwrap();
        assert_eq!(args.jobs, Some(3));
        assert_eq!(args.tools, vec!["a", "b"]);
        assert!(args.dry_run);
        assert_eq!(args.files, vec![PathBuf::from("x.sh"), PathBuf::from("y.sh")]);
        assert_eq!(args.config, "Procpool.toml");
    }

    #[test]
    fn parses_ad_hoc_command() {
        let args =
            CliArgs::try_parse_from(["procpool", "--command", "wc -l", "--combine-output", "f"])
                .unwrap();
        assert_eq!(args.command.as_deref(), Some("wc -l"));
        assert!(args.combine_output);
    }
}
