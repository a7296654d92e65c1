//! Client Error Types

use thiserror::Error;

use crate::shared::error::SharedError;

/// Errors raised by the client library
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable body
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request failed: {status} - {message}")]
    Api { status: u16, message: String },

    /// A protected call was made before logging in
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Local replay of a move failed
    #[error(transparent)]
    Domain(#[from] SharedError),

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to write config file: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl ClientError {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
