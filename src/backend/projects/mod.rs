//! Projects Module
//!
//! REST handlers for the project → board → column → card hierarchy and
//! for project membership.
//!
//! # Architecture
//!
//! Every mutation runs through [`KanbanStore::update_project`]: the
//! permission check and the change happen on one draft under the store's
//! write lock, then the matching event is published to `project:<id>`.
//!
//! # Module Structure
//!
//! ```text
//! projects/
//! ├── mod.rs      - Module exports and documentation
//! ├── access.rs   - Role and visibility checks
//! ├── types.rs    - Request/response types
//! ├── handlers.rs - Project CRUD
//! ├── members.rs  - Membership and ownership transfer
//! ├── boards.rs   - Board CRUD
//! ├── columns.rs  - Column CRUD and reordering
//! ├── cards.rs    - Card CRUD and movement
//! └── comments.rs - Card comments
//! ```
//!
//! [`KanbanStore::update_project`]: crate::backend::store::KanbanStore::update_project

/// Role and visibility checks
pub mod access;

/// Request and response types
pub mod types;

/// Project handlers
pub mod handlers;

/// Member handlers
pub mod members;

/// Board handlers
pub mod boards;

/// Column handlers
pub mod columns;

/// Card handlers
pub mod cards;

/// Comment handler
pub mod comments;

pub use access::{load_authorized, require};
