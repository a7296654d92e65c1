//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//! Handlers are organized into focused submodules for maintainability.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── signup.rs    - User registration handler
//! ├── login.rs     - User authentication handler
//! ├── me.rs        - Current user and logout handlers
//! └── providers.rs - Linked identity providers
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /auth/signup - User registration
//! - **`login`** - POST /auth/login - User authentication
//! - **`get_me`** - GET /auth/me - Get current user info
//! - **`logout`** - POST /auth/logout - Stateless logout
//! - **`link_provider`** / **`unlink_provider`** - PUT/DELETE /auth/providers/{provider}

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Current user handlers
pub mod me;

/// Provider link handlers
pub mod providers;

// Re-export commonly used types
pub use types::{AuthResponse, LoginRequest, SignupRequest};

// Re-export handlers
pub use login::login;
pub use me::{get_me, logout};
pub use providers::{link_provider, unlink_provider};
pub use signup::signup;
