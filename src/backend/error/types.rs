/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Handler errors occur when processing HTTP requests:
 * - Missing or invalid request fields
 * - Authentication failures
 * - Unknown projects, boards, columns or cards
 *
 * ## Permission Errors
 *
 * Raised when a project member lacks the permission an endpoint requires.
 * The response carries the caller's role so clients can explain the refusal.
 *
 * ## State and Export Errors
 *
 * Failures of the in-memory store or the PDF renderer. Database write-through
 * failures never reach a handler; the store logs them.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::{Permission, Role, SharedError};

/// Backend-specific error types
///
/// This enum represents all possible errors that can occur in the backend.
/// Each variant includes relevant context and can be converted to an HTTP response.
///
/// # Usage
///
/// ```rust
/// use taskflow::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Name is required");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
///
/// let err = BackendError::not_found("Board not found");
/// assert_eq!(err.message(), "Board not found");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing fields, invalid request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The caller is a member but lacks a permission
    #[error("Insufficient permissions. Required: {required}")]
    PermissionDenied {
        /// Permission the endpoint requires
        required: Permission,
        /// Caller's role in the project
        role: Role,
    },

    /// State management error
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// PDF export failure
    #[error("Export error: {message}")]
    ExportError {
        /// Human-readable error message
        message: String,
    },

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Error message
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Create a new state error
    ///
    /// # Arguments
    ///
    /// * `message` - Error message
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `PermissionDenied` - 403 Forbidden
    /// - `StateError`, `ExportError` - 500 Internal Server Error
    /// - `SharedError` - Depends on the shared error type
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::StateError { .. } | Self::ExportError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::NotFound { .. } => StatusCode::NOT_FOUND,
                SharedError::Conflict { .. } => StatusCode::CONFLICT,
                SharedError::LimitReached { .. } => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Get the error message
    ///
    /// Internal failures are reported generically; the detail is logged
    /// when the response is built.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::PermissionDenied { .. } => self.to_string(),
            Self::StateError { .. } | Self::ExportError { .. } => "Server error".to_string(),
            Self::SharedError(err) => err.detail(),
        }
    }
}
