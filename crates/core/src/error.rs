// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Dispatch itself never returns this (failures are folded into `OperationResult`);
/// it is used at the edges: configuration loading and RPC parameter validation.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] crate::domain::DispatchError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
