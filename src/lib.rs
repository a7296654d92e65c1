//! TaskFlow - Collaborative Kanban Backend
//!
//! Projects hold boards, boards hold ordered columns, columns hold ordered
//! cards. Members act under a role with a fixed permission matrix. Every
//! change is pushed to connected clients in real time.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Kanban model, roles and permissions, ordering, real-time events, errors
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, WebSocket and SSE channels
//!   - Authentication, projects, notifications, PDF export, calendar sync
//!   - PostgreSQL write-through persistence
//!
//! - **`client`** - REST client and optimistic board mirror
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and their dependencies
//!
//! # Usage
//!
//! ```rust,no_run
//! use taskflow::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client library
pub mod client;
