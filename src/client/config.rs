//! Client Configuration
//!
//! Server URL and the stored session token. Loaded from
//! `<config dir>/taskflow/client.toml` when present, then overridden by
//! `TASKFLOW_API_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::error::ClientError;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// JWT from the last login, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: None,
        }
    }

    /// Location of the per-user config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskflow").join("client.toml"))
    }

    /// Load from the default path, falling back to defaults when absent
    pub fn load() -> Result<Self, ClientError> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        if let Ok(url) = std::env::var("TASKFLOW_API_URL") {
            config.server_url = url;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ClientError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }
}
