//! Real-time Update Module
//!
//! This module pushes project changes and per-user notifications to
//! connected clients as they happen.
//!
//! # Architecture
//!
//! The realtime module is organized into focused submodules:
//!
//! - **`broadcast`** - Room registry and broadcasting helpers
//! - **`gate`** - Per-event access check for project rooms
//! - **`socket`** - WebSocket endpoint with room join/leave frames
//! - **`subscription`** - Server-Sent Events stream of one project
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Rooms and event broadcasting
//! ├── gate.rs         - Project room access per event
//! ├── socket.rs       - WebSocket handler
//! └── subscription.rs - SSE subscription handler
//! ```
//!
//! # Rooms
//!
//! - `project:<id>` - every member viewing the project
//! - `user:<id>` - one user's notifications, joined automatically
//!
//! Project room listeners are re-checked on every event. Losing view access
//! (removal, project deletion) ends the socket forwarder or SSE stream.
//!
//! # Event Filtering
//!
//! SSE clients can filter events by name using the `types` query parameter:
//! - `?types=card:moved,card:created` - Only card moves and creations
//! - No parameter - All events of the project

/// Room registry and broadcasting
pub mod broadcast;

/// Per-event access check
pub mod gate;

/// WebSocket handler
pub mod socket;

/// Server-Sent Events subscription handler
pub mod subscription;

// Re-export commonly used types and functions
pub use broadcast::{broadcast_event, RealtimeEventBroadcast, Room, RoomRegistry};
pub use gate::{project_delivery, Delivery};
pub use socket::{handle_socket_upgrade, ClientFrame, ServerFrame};
pub use subscription::handle_project_subscription;
