//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading (TOML, environment, database)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: defaults, then `taskflow.toml`, then environment
//! 2. **Database**: connect and migrate when `DATABASE_URL` is set
//! 3. **State Restoration**: load persisted users, projects and notifications
//! 4. **Background Tasks**: periodic sweep of idle real-time rooms
//! 5. **Router Creation**: configure all routes and middleware

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::ServerConfig;
pub use init::{build_state, create_app};
pub use state::AppState;
