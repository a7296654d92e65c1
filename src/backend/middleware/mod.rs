//! Middleware Module
//!
//! This module contains all HTTP middleware for the backend server.
//! Middleware functions process requests before they reach handlers.
//!
//! # Architecture
//!
//! - **`auth`** - Bearer-token authentication for protected routes
//! - **`extract`** - Body, path and query extractors with JSON rejections

pub mod auth;
pub mod extract;

pub use auth::{auth_middleware, authenticate, bearer_token, AuthUser, AuthenticatedUser};
pub use extract::{ApiJson, ApiPath, ApiQuery};
