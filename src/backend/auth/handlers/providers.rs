/**
 * Provider Link Handlers
 *
 * - `PUT /auth/providers/{provider}` - store credentials of a linked provider
 * - `DELETE /auth/providers/{provider}` - unlink it
 *
 * The OAuth consent flow happens outside this server; these endpoints only
 * record its result so that calendar sync can use the tokens.
 */

use axum::{
    extract::State,
    response::Json,
};

use crate::backend::auth::handlers::types::{LinkProviderRequest, LinkedProvidersResponse};
use crate::backend::auth::users::{AuthProvider, ProviderLink, User};
use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::server::state::AppState;

fn linked(user: &User) -> LinkedProvidersResponse {
    LinkedProvidersResponse {
        providers: user.providers.iter().map(|p| p.provider.to_string()).collect(),
    }
}

/// Link a provider (PUT /auth/providers/{provider})
///
/// # Errors
///
/// * `400 Bad Request` - Unknown provider or empty `providerId`
pub async fn link_provider(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(provider): ApiPath<String>,
    ApiJson(request): ApiJson<LinkProviderRequest>,
) -> Result<Json<LinkedProvidersResponse>, BackendError> {
    let provider: AuthProvider = provider.parse()?;
    if request.provider_id.trim().is_empty() {
        return Err(BackendError::bad_request("Provider ID is required"));
    }

    let link = ProviderLink {
        provider,
        provider_id: request.provider_id,
        access_token: request.access_token,
        refresh_token: request.refresh_token,
    };
    let response = app_state
        .store
        .update_user(user.user_id, |account| {
            account.link_provider(link);
            linked(account)
        })
        .await
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!("User {} linked {}", user.user_id, provider);
    Ok(Json(response))
}

/// Unlink a provider (DELETE /auth/providers/{provider})
///
/// # Errors
///
/// * `404 Not Found` - Provider was not linked
pub async fn unlink_provider(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(provider): ApiPath<String>,
) -> Result<Json<LinkedProvidersResponse>, BackendError> {
    let provider: AuthProvider = provider.parse()?;

    let (removed, response) = app_state
        .store
        .update_user(user.user_id, |account| {
            let removed = account.unlink_provider(provider);
            (removed, linked(account))
        })
        .await
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    if !removed {
        return Err(BackendError::not_found("Provider not linked"));
    }
    tracing::info!("User {} unlinked {}", user.user_id, provider);
    Ok(Json(response))
}
