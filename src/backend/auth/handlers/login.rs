/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Generate JWT token
 * 4. Return token and user profile
 *
 * # Security
 *
 * - Invalid credentials return 401 Unauthorized (no information leakage)
 * - Provider-only accounts have no password and cannot log in here
 */

use axum::{extract::State, response::Json};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::error::BackendError;
use crate::backend::middleware::ApiJson;
use crate::backend::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - Unknown email or wrong password
/// * `500 Internal Server Error` - Verification or token generation failed
///
/// # Example Request
///
/// ```http
/// POST /auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "securepassword123"
/// }
/// ```
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    tracing::info!("Login request for: {}", request.email);

    let user = app_state.store.user_by_email(&request.email).await.ok_or_else(|| {
        tracing::warn!("User not found: {}", request.email);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let password_hash = user.password_hash.clone().ok_or_else(|| {
        tracing::warn!("User {} has no local password", user.id);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let password = request.password;
    let valid = tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| BackendError::state(format!("verify task: {}", e)))?
        .map_err(|e| {
            tracing::error!("Password verification error: {:?}", e);
            BackendError::state("password verification failed")
        })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", request.email);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = create_token(
        user.id,
        &user.email,
        &app_state.config.jwt_secret,
        app_state.config.jwt_ttl_secs,
    )
    .map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::state("token creation failed")
    })?;

    tracing::info!("User logged in successfully: {} ({})", user.id, user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}
