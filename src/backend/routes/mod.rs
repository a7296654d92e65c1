//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, layers and fallback
//! └── api_routes.rs   - Public and protected API endpoints
//! ```
//!
//! # Route Organization
//!
//! 1. **Service Routes** - `/health`, `/ws`
//! 2. **Public API Routes** - `/auth/signup`, `/auth/login`
//! 3. **Protected API Routes** - projects, boards, columns, cards, members,
//!    notifications, export and calendar sync; all behind the bearer-token
//!    middleware
//! 4. **Fallback Handler** - JSON 404
//!
//! # Example
//!
//! ```rust,no_run
//! use taskflow::backend::routes::create_router;
//! use taskflow::backend::server::config::ServerConfig;
//! use taskflow::backend::server::state::AppState;
//! use taskflow::backend::store::KanbanStore;
//!
//! let state = AppState::new(ServerConfig::default(), KanbanStore::in_memory());
//! let router = create_router(state);
//! ```

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
