//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the backend and the client library. These types are used for
//! serialization over the REST API and the real-time channels.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code:
//!
//! - **`model`** - Projects, boards, columns, cards, members, notifications
//! - **`permissions`** - Roles and the fixed permission matrix
//! - **`ordering`** - Card and column movement with order re-sequencing
//! - **`event`** - Real-time events broadcast to connected clients
//! - **`error`** - Domain errors

/// Kanban data model
pub mod model;

/// Roles and permissions
pub mod permissions;

/// Card and column ordering
pub mod ordering;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use event::{EventPayload, RealtimeEvent};
pub use model::{
    ActivityEntry, Attachment, Board, Card, CardStatus, Column, Comment, MemberView, Notification,
    NotificationKind, NotificationPage, Priority, Project, ProjectMember, ProjectSettings,
    UserProfile, Visibility,
};
pub use ordering::{move_card, CardMove, MoveOutcome};
pub use permissions::{Permission, Role, RolePermissions};
