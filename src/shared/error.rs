//! Shared Error Types
//!
//! This module defines error types that are shared between the client and backend.
//! These errors represent domain failures that can occur on either side, for
//! example when a client replays a pending card move over its local board copy.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures
//! - `NotFound` - A referenced project, board, column or card does not exist
//! - `Conflict` - The operation collides with existing data
//! - `LimitReached` - A column's work-in-progress limit would be exceeded
//!
//! # Usage
//!
//! ```rust
//! use taskflow::shared::error::SharedError;
//!
//! let error = SharedError::validation("name", "Name is required");
//! assert_eq!(error.detail(), "Name is required");
//! ```

use thiserror::Error;

/// Shared error types that can occur in both client and backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Referenced entity is missing
    #[error("{message}")]
    NotFound {
        /// Human-readable error message, e.g. "Target column not found"
        message: String,
    },

    /// Operation conflicts with existing state
    #[error("{message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// Column work-in-progress limit reached
    #[error("Column limit reached")]
    LimitReached {
        /// Column name
        column: String,
        /// Configured limit
        limit: u32,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Message suitable for an API response body.
    ///
    /// Validation errors drop the field prefix so that clients see the plain
    /// message (`"Name is required"`), everything else uses `Display`.
    pub fn detail(&self) -> String {
        match self {
            Self::ValidationError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Helper trait for converting serialization errors
impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
