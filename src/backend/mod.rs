//! Backend Module
//!
//! This module contains all server-side code for TaskFlow: an Axum HTTP
//! server with REST endpoints, WebSocket and SSE real-time channels, and
//! optional PostgreSQL persistence.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Signup, login, JWT tokens, linked providers
//! - **`middleware`** - Bearer-token authentication
//! - **`store`** - In-memory working set with write-through persistence
//! - **`projects`** - Projects, members, boards, columns, cards, comments
//! - **`realtime`** - Rooms, WebSocket sessions, SSE subscriptions
//! - **`notifications`** - Per-user notifications
//! - **`export`** - PDF export of a project
//! - **`calendar`** - Google Calendar sync of card due dates
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs           - Module exports and documentation
//! ├── server/          - Server initialization and state
//! ├── routes/          - Route configuration
//! ├── auth/            - Authentication
//! ├── middleware/      - Request middleware
//! ├── store/           - Working set and database access
//! ├── projects/        - Kanban handlers
//! ├── realtime/        - Event broadcasting
//! ├── notifications/   - Notifications
//! ├── export/          - PDF export
//! ├── calendar/        - Calendar sync
//! └── error/           - Error types
//! ```
//!
//! # Thread Safety
//!
//! - `Arc<RwLock<>>` around the working set
//! - `broadcast::Sender` per real-time room
//! - The database pool is shared and thread-safe

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time update system
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// In-memory store and persistence
pub mod store;

/// Projects, boards, columns and cards
pub mod projects;

/// User notifications
pub mod notifications;

/// PDF export
pub mod export;

/// Google Calendar sync
pub mod calendar;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::{broadcast_event, RealtimeEventBroadcast};
pub use server::create_app;
