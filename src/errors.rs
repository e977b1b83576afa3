// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ProcpoolError`] is what config loading and the CLI layer return.
//! - [`ResolveError`] is reported synchronously when a command handle is
//!   constructed.
//! - [`ExecError`] is what a single subprocess run hands to its callback.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcpoolError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failure to turn a name or command line into an executable.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("command is empty")]
    Empty,

    #[error("could not parse command line {line:?}: {source}")]
    Parse {
        line: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("command {command:?} was not found: {source}")]
    NotFound {
        command: String,
        #[source]
        source: which::Error,
    },
}

/// Outcome of a failed subprocess run.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("could not start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("could not write to stdin of {program} process: {source}")]
    Stdin { program: String, source: io::Error },

    #[error("could not wait for {program} process: {source}")]
    Wait { program: String, source: io::Error },

    #[error("{program} was terminated. stderr: {stderr:?}")]
    Terminated { program: String, stderr: String },

    #[error("{program} exited with status {code} but stdout was empty. stderr: {stderr:?}")]
    EmptyStdout {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("could not acquire a process slot to run {program:?}: pool is closed")]
    Admission { program: String },
}

pub type Result<T> = std::result::Result<T, ProcpoolError>;
