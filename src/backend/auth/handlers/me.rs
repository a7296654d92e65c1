/**
 * Current User Handlers
 *
 * - `GET /auth/me` - profile of the authenticated user
 * - `POST /auth/logout` - acknowledge logout (tokens are stateless)
 */

use axum::{extract::State, response::Json};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::projects::types::MessageResponse;
use crate::backend::server::state::AppState;
use crate::shared::UserProfile;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - Missing or invalid token (rejected by the middleware)
/// * `404 Not Found` - User vanished after the token was checked
///
/// # Example Response
///
/// ```json
/// {
///   "id": "123e4567-e89b-12d3-a456-426614174000",
///   "email": "user@example.com",
///   "name": "Ada",
///   "avatarUrl": null
/// }
/// ```
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>, BackendError> {
    let account = app_state.store.user(user.user_id).await.ok_or_else(|| {
        tracing::warn!("User not found: {}", user.user_id);
        BackendError::not_found("User not found")
    })?;
    Ok(Json(account.profile()))
}

/// Logout handler
///
/// The client discards its token; nothing is revoked server-side.
pub async fn logout(AuthUser(user): AuthUser) -> Json<MessageResponse> {
    tracing::info!("User logged out: {}", user.user_id);
    Json(MessageResponse::new("Logged out"))
}
