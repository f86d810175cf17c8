//! Error types for the machine profile crate.
//!
//! This module provides structured error types for machine profile
//! validation.

use thiserror::Error;

/// Errors related to machine profile validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A min/default/max triple is inconsistent.
    #[error("Invalid bounds for {field}: {reason}")]
    InvalidBounds { field: String, reason: String },

    /// A numeric value is out of valid range.
    #[error("Value out of range for '{field}': {value}")]
    ValueOutOfRange { field: String, value: String },

    /// The post processor name is unknown.
    #[error("Unknown post processor: {0}")]
    UnknownPostProcessor(String),
}

/// Result type alias for profile validation operations.
pub type ProfileResult<T> = Result<T, ProfileError>;
