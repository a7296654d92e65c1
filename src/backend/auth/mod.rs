//! Authentication Module
//!
//! This module handles user authentication, registration, and session management.
//! It provides HTTP handlers for authentication endpoints and manages user data
//! and JWT tokens.
//!
//! # Architecture
//!
//! The auth module is organized into focused submodules:
//!
//! - **`users`** - Server-side user record and signup validation
//! - **`sessions`** - JWT token generation and validation
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: User provides email, name and password → User created → JWT token returned
//! 2. **Login**: User provides email and password → Credentials verified → JWT token returned
//! 3. **Me**: User provides JWT token → Token verified → Profile returned
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens are used for stateless authentication
//! - Token lifetime is configurable (7 days by default)
//! - Invalid credentials return 401 (no information leakage)

/// User model
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest};
pub use handlers::{get_me, link_provider, login, logout, signup, unlink_provider};
