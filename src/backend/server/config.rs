/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration and
 * the optional PostgreSQL database connection.
 *
 * # Configuration Sources
 *
 * Values are layered, later sources win:
 *
 * 1. Built-in defaults suitable for local development
 * 2. A TOML file: `$TASKFLOW_CONFIG`, else `./taskflow.toml` if present
 * 3. Environment variables (`PORT`, `DATABASE_URL`, `JWT_SECRET`, ...)
 *
 * # Error Handling
 *
 * Malformed configuration is a startup error. A missing or unreachable
 * database is not: the pool is set to `None` and the server keeps running
 * with its in-memory store only.
 */

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Secret used when none is configured. Only suitable for development.
const DEV_JWT_SECRET: &str = "taskflow-dev-secret-change-me";

/// Database configuration result
///
/// Contains the database connection pool if successfully configured,
/// or `None` if the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Calendar integration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    /// Base URL of the Google Calendar v3 API
    pub api_base: String,
    /// Calendar events are written to
    pub calendar_id: String,
    /// IANA time zone attached to created events
    pub time_zone: String,
    pub event_duration_minutes: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            time_zone: "UTC".to_string(),
            event_duration_minutes: 60,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub jwt_ttl_secs: u64,
    pub bcrypt_cost: u32,
    /// Allowed CORS origin
    pub frontend_url: String,
    /// Buffered events per room before slow receivers start lagging
    pub broadcast_capacity: usize,
    /// Interval of the idle-room sweep
    pub room_cleanup_secs: u64,
    pub calendar: CalendarConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_secs: 7 * 24 * 60 * 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            frontend_url: "http://localhost:3000".to_string(),
            broadcast_capacity: 256,
            room_cleanup_secs: 300,
            calendar: CalendarConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` for environment variables
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use taskflow::backend::server::config::ServerConfig;
    ///
    /// let env = HashMap::from([("PORT", "8080")]);
    /// let config = ServerConfig::load_from(|k| env.get(k).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.port, 8080);
    /// ```
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("TASKFLOW_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new("taskflow.toml").exists() => Self::from_file(Path::new("taskflow.toml"))?,
            None => Self::default(),
        };
        config.apply_env(&lookup)?;
        config.validate()?;

        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set, using the development secret");
        }
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(toml::from_str(&text)?)
    }

    fn apply_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_number("PORT", &port)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("JWT_EXPIRES_IN") {
            self.jwt_ttl_secs = parse_duration_secs(&ttl).ok_or(ConfigError::InvalidValue {
                key: "JWT_EXPIRES_IN",
                value: ttl.clone(),
            })?;
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            self.bcrypt_cost = parse_number("BCRYPT_COST", &cost)?;
        }
        if let Some(url) = lookup("FRONTEND_URL") {
            self.frontend_url = url;
        }
        if let Some(capacity) = lookup("BROADCAST_CAPACITY") {
            self.broadcast_capacity = parse_number("BROADCAST_CAPACITY", &capacity)?;
        }
        if let Some(base) = lookup("GOOGLE_CALENDAR_API_BASE") {
            self.calendar.api_base = base;
        }
        if let Some(tz) = lookup("CALENDAR_TIME_ZONE") {
            self.calendar.time_zone = tz;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "jwt_secret",
                value: String::new(),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "bcrypt_cost",
                value: self.bcrypt_cost.to_string(),
            });
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "broadcast_capacity",
                value: "0".to_string(),
            });
        }
        if self.calendar.event_duration_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "calendar.event_duration_minutes",
                value: self.calendar.event_duration_minutes.to_string(),
            });
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Parse `"7d"`, `"12h"`, `"30m"`, `"45s"` or plain seconds
pub fn parse_duration_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, unit) = match value.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&value[..i], c),
        _ => (value, 's'),
    };
    let amount: u64 = digits.parse().ok()?;
    let factor = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return None,
    };
    amount.checked_mul(factor)
}

/// Load and initialize database connection pool
///
/// This function:
/// 1. Creates a PostgreSQL connection pool for `database_url`
/// 2. Runs the embedded migrations
///
/// # Returns
///
/// - `Some(PgPool)` if database is successfully configured
/// - `None` if no URL is configured or connection fails
///
/// # Errors
///
/// Errors are logged but do not prevent server startup. The server falls
/// back to the in-memory store.
pub async fn load_database(database_url: Option<&str>) -> DatabaseConfig {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Running with in-memory storage only.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Running with in-memory storage only.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
