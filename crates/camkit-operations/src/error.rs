//! Error types for the operations crate.
//!
//! Unresolved geometry and strategy conflicts are recorded on the operation
//! itself as flags and warnings. The errors here cover caller misuse only:
//! unknown names, rejected edits and refused state transitions.

use std::io;
use thiserror::Error;

/// Errors returned by operation and session methods.
#[derive(Error, Debug)]
pub enum OperationError {
    /// No operation with this name exists in the session.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// No chain with this name exists in the session.
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    /// The name is already taken by another operation or chain.
    #[error("Name already in use: {0}")]
    DuplicateName(String),

    /// Operation and chain names must not be empty.
    #[error("Name must not be empty")]
    EmptyName,

    /// The strategy is only selectable with experimental features enabled.
    #[error("Strategy {strategy} requires experimental features")]
    ExperimentalStrategy { strategy: String },

    /// A numeric edit carried NaN or an infinite value.
    #[error("Non-finite value for '{field}' on operation '{operation}'")]
    NonFiniteValue { operation: String, field: String },

    /// The operation (or chain) has no valid input and cannot be computed or exported.
    #[error("'{name}' is not valid: {reason}")]
    Invalid { name: String, reason: String },

    /// A background computation is already recorded for the operation.
    #[error("'{name}' is already computing (pid {pid})")]
    AlreadyComputing { name: String, pid: u32 },

    /// An export of the chain is already running.
    #[error("Chain '{0}' is already computing")]
    ChainComputing(String),

    /// The session file was written by an incompatible version.
    #[error("Unsupported session format version: {0}")]
    UnsupportedFormat(u32),

    /// I/O error during session file handling.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OperationError {
    /// Whether the error names something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownOperation(_) | Self::UnknownChain(_))
    }
}

/// Result type alias for operation methods.
pub type OperationResult<T> = Result<T, OperationError>;
