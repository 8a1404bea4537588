// Domain Error Types

use crate::domain::{Operation, Platform};
use crate::port::CommandError;
use thiserror::Error;

/// Failures a dispatched operation can hit before it is normalized into an `OperationResult`
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Missing target for {0}")]
    MissingTarget(Operation),

    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("Missing option '{option}' for {operation}")]
    MissingOption {
        operation: Operation,
        option: &'static str,
    },

    #[error("Command '{command}' failed: {source}")]
    ExternalCommand {
        command: String,
        #[source]
        source: CommandError,
    },

    #[error("Failed to parse command output: {0}")]
    Parse(#[from] ParseError),

    #[error("{feature} is not implemented on {platform}")]
    PlatformUnsupported { feature: String, platform: Platform },

    #[error("Filesystem error on {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not running")]
    NotRunning(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single telemetry measurement (always recoverable)
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Query failed: {0}")]
    Command(#[from] CommandError),

    #[error("Unparseable output: {0}")]
    Parse(#[from] ParseError),

    #[error("Sample timed out after {0}ms")]
    SampleTimeout(u64),

    #[error("No {0} query on this platform")]
    Unsupported(&'static str),
}

/// Malformed external command output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("output is empty")]
    Empty,

    #[error("expected at least {expected} rows, found {found}")]
    MissingRow { expected: usize, found: usize },

    #[error("expected at least {expected} columns, found {found}")]
    MissingColumn { expected: usize, found: usize },

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("unexpected header: {0:?}")]
    UnexpectedHeader(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
