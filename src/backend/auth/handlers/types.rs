/**
 * Authentication Handler Types
 *
 * This module defines the request and response types used by authentication handlers.
 * These types are shared across signup, login, me and provider handlers.
 */

use serde::{Deserialize, Serialize};

use crate::shared::UserProfile;

/// Sign up request
///
/// Contains the email, display name and password for user registration.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct SignupRequest {
    /// User's email address
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// User's password (will be hashed before storage)
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginRequest {
    /// User's email address
    #[serde(default)]
    pub email: String,
    /// User's password (will be verified against stored hash)
    #[serde(default)]
    pub password: String,
}

/// Auth response
///
/// Returned by signup and login handlers. Contains the JWT token
/// and the public profile for immediate authentication.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// JWT token for authentication
    pub token: String,
    /// User information (without sensitive data)
    pub user: UserProfile,
}

/// Credentials of an identity provider to link
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkProviderRequest {
    #[serde(default)]
    pub provider_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Linked providers of the current user, tokens omitted
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkedProvidersResponse {
    pub providers: Vec<String>,
}
