//! # Errors
//!
//! Typed failures for dispatch, execution and token bootstrap.
//! Dispatch and execution errors go back to the caller; bootstrap errors end the process.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unsupported command: {0}")]
    Unsupported(String),
    #[error("template '{template}' expects {expected} argument(s), got {got}")]
    FormatArity {
        template: String,
        expected: usize,
        got: usize,
    },
    #[error("template '{template}' uses unsupported verb %{verb}")]
    UnknownVerb { template: String, verb: char },
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("empty command line")]
    EmptyCommand,
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("command exited with {status}: {output}")]
    Exit { status: String, output: String },
    #[error("{0}")]
    Stderr(String),
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("I/O error while waiting for command: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("token must be exactly {expected} characters, got {0}", expected = crate::application::bootstrap::TOKEN_LENGTH)]
    InvalidTokenLength(usize),
    #[error("no configuration file found in {0:?}")]
    NoConfigFound(Vec<PathBuf>),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path}: line {line}: {reason}")]
    Unsupported {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("no top-level 'token' key in {0}")]
    TokenKeyMissing(PathBuf),
    #[error("edited document {0} does not read back the new token")]
    Verify(PathBuf),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
