//! Notifications Module
//!
//! Per-user notifications generated by project activity.
//!
//! - **`service`** - store a notification and push it to the user's room
//! - **`handlers`** - list and mark-read endpoints

/// Notification delivery
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use handlers::{list_notifications, mark_all_read, mark_read};
pub use service::{notify, notify_many};
