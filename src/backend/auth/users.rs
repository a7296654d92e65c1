/**
 * User Model
 *
 * This module defines the server-side user record. Unlike the public
 * `UserProfile`, it holds the bcrypt password hash and linked provider
 * credentials, so it never leaves the backend.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::{SharedError, UserProfile};

/// Identity provider a user can sign in with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Local,
}

impl FromStr for AuthProvider {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "local" => Ok(Self::Local),
            _ => Err(SharedError::validation("provider", "Unknown provider")),
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => f.write_str("google"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// Credentials of a linked identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLink {
    pub provider: AuthProvider,
    pub provider_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// User struct as held by the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Lower-cased email address, unique across users
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Hashed password (bcrypt), absent for provider-only accounts
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub providers: Vec<ProviderLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, name: &str, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            avatar_url: None,
            password_hash,
            providers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Public profile of this user
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn provider(&self, provider: AuthProvider) -> Option<&ProviderLink> {
        self.providers.iter().find(|p| p.provider == provider)
    }

    /// Link a provider, replacing an earlier link of the same kind
    pub fn link_provider(&mut self, link: ProviderLink) {
        self.providers.retain(|p| p.provider != link.provider);
        self.providers.push(link);
        self.updated_at = Utc::now();
    }

    /// Returns `false` if the provider was not linked
    pub fn unlink_provider(&mut self, provider: AuthProvider) -> bool {
        let before = self.providers.len();
        self.providers.retain(|p| p.provider != provider);
        let removed = self.providers.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

/// Canonical form of an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate signup input
///
/// - Email must contain '@' character (basic validation)
/// - Name must not be blank
/// - Password must be at least 8 characters long
pub fn validate_signup(email: &str, name: &str, password: &str) -> Result<(), SharedError> {
    if !email.contains('@') {
        return Err(SharedError::validation("email", "Invalid email format"));
    }
    if name.trim().is_empty() {
        return Err(SharedError::validation("name", "Name is required"));
    }
    if password.chars().count() < 8 {
        return Err(SharedError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}
