//! Error types for the store and service layers.

use crate::types::NodeId;
use thiserror::Error;

/// Failures raised by a Node Store implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Record encoding error: {0}")]
    Codec(String),

    #[error("Node #{0} not found in store")]
    NodeNotFound(NodeId),

    #[error("Transaction aborted: {0}")]
    Transaction(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Errors surfaced by the forest service and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Node #{0} not found")]
    NotFound(NodeId),

    #[error("Invalid node name: {0}")]
    InvalidName(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output encoding failed: {0}")]
    OutputError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::OutputError(err.to_string())
    }
}
