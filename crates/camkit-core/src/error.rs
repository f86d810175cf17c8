//! Error handling for CamKit
//!
//! Provides the error types shared by every layer of the workspace:
//! - Scene errors (geometry inventory loading and lookup)
//! - I/O errors from file handling
//!
//! Data-model anomalies such as an unresolved geometry source are never
//! errors; they are recorded as flags on the operation. The types here only
//! cover caller misuse and file handling.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Scene error type
///
/// Represents errors raised while building or loading a scene inventory
/// used to resolve geometry source names.
#[derive(Error, Debug, Clone)]
pub enum SceneError {
    /// An entity with this name is already registered for the kind
    #[error("Duplicate {kind} '{name}'")]
    DuplicateEntity {
        /// The entity kind.
        kind: String,
        /// The entity name.
        name: String,
    },

    /// An entity name was empty
    #[error("Empty {kind} name")]
    EmptyName {
        /// The entity kind.
        kind: String,
    },

    /// The scene inventory file could not be parsed
    #[error("Invalid scene inventory: {reason}")]
    InvalidInventory {
        /// The reason the inventory is invalid.
        reason: String,
    },
}

/// Main error type for CamKit
///
/// A unified error type that the crates convert into at their public
/// boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a scene error
    pub fn is_scene_error(&self) -> bool {
        matches!(self, Error::Scene(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_error_display() {
        let err = SceneError::DuplicateEntity {
            kind: "object".to_string(),
            name: "Cube".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate object 'Cube'");

        let err = SceneError::EmptyName {
            kind: "image".to_string(),
        };
        assert_eq!(err.to_string(), "Empty image name");
    }

    #[test]
    fn test_error_conversion() {
        let scene_err = SceneError::InvalidInventory {
            reason: "missing groups".to_string(),
        };
        let err: Error = scene_err.into();
        assert!(err.is_scene_error());
        assert_eq!(err.to_string(), "Invalid scene inventory: missing groups");

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.is_io_error());
    }
}
