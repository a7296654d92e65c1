//! Client Library
//!
//! Rust client for the TaskFlow server:
//!
//! - **`api`** - async REST client (reqwest)
//! - **`mirror`** - optimistic board copy reconciled with real-time events
//! - **`config`** - server URL and stored token
//! - **`error`** - client error type

pub mod api;
pub mod config;
pub mod error;
pub mod mirror;

pub use api::{ApiClient, AuthSession};
pub use config::ClientConfig;
pub use error::ClientError;
pub use mirror::{BoardMirror, PendingMove};
