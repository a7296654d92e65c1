/**
 * Error Conversion
 *
 * This module provides conversion implementations for backend errors,
 * allowing them to be returned directly from Axum handlers.
 *
 * # Response Format
 *
 * Error responses are returned as JSON with the following structure:
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 *
 * Permission failures additionally carry the caller's role:
 * ```json
 * {
 *   "error": "Insufficient permissions. Required: canEdit",
 *   "status": 403,
 *   "yourRole": "viewer"
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Json, Response},
};
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    /// Convert a backend error into an HTTP response
    ///
    /// Server-side failures are logged here with their full detail, the
    /// client only sees the generic message.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status.as_u16(), message);
        }

        let mut body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });
        if let BackendError::PermissionDenied { role, .. } = &self {
            body["yourRole"] = serde_json::Value::String(role.to_string());
        }

        (status, Json(body)).into_response()
    }
}
