/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate email format, name and password length
 * 2. Hash password using bcrypt
 * 3. Create the user (the store rejects duplicate emails)
 * 4. Generate JWT token
 * 5. Return token and user profile
 *
 * # Security
 *
 * - Passwords are hashed using bcrypt with the configured cost
 * - Passwords are never returned in responses
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::hash;

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{validate_signup, User};
use crate::backend::error::BackendError;
use crate::backend::middleware::ApiJson;
use crate::backend::server::state::AppState;

/// Sign up handler
///
/// # Returns
///
/// `201 Created` with JWT token and user profile
///
/// # Errors
///
/// * `400 Bad Request` - Invalid email, empty name or password shorter than 8
/// * `409 Conflict` - Email already registered
/// * `500 Internal Server Error` - Password hashing or token generation failed
///
/// # Example Request
///
/// ```http
/// POST /auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "name": "Ada",
///   "password": "securepassword123"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "user": {
///     "id": "123e4567-e89b-12d3-a456-426614174000",
///     "email": "user@example.com",
///     "name": "Ada",
///     "avatarUrl": null
///   }
/// }
/// ```
pub async fn signup(
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    tracing::info!("Signup request for email: {}", request.email);

    validate_signup(&request.email, &request.name, &request.password).map_err(|e| {
        tracing::warn!("Signup rejected: {}", e.detail());
        e
    })?;

    let cost = app_state.config.bcrypt_cost;
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| BackendError::state(format!("hash task: {}", e)))?
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            BackendError::state("password hashing failed")
        })?;

    let user = app_state
        .store
        .create_user(User::new(&request.email, &request.name, Some(password_hash)))
        .await
        .map_err(|e| {
            tracing::warn!("Email already exists: {}", request.email);
            e
        })?;

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

    tracing::info!("User created successfully: {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}
