/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The Kanban store (users, projects, notifications)
 * - Real-time rooms for project and user events
 * - The loaded server configuration
 * - The Google Calendar client
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and safe to share: the store and the room
 * registry are `Arc`-backed, the configuration is immutable behind an `Arc`.
 *
 * # Example
 *
 * ```rust,no_run
 * use taskflow::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(app_state): State<AppState>) {
 *     let rooms = app_state.rooms.room_count();
 *     tracing::debug!("{} active rooms", rooms);
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::calendar::client::GoogleCalendarClient;
use crate::backend::realtime::broadcast::RoomRegistry;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::KanbanStore;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Authoritative working set, written through to PostgreSQL when configured
    pub store: KanbanStore,

    /// Broadcast channels keyed by `project:<id>` and `user:<id>` rooms
    pub rooms: RoomRegistry,

    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Outbound Google Calendar API client
    pub calendar: GoogleCalendarClient,
}

impl AppState {
    /// Build state around an existing store
    pub fn new(config: ServerConfig, store: KanbanStore) -> Self {
        let rooms = RoomRegistry::new(config.broadcast_capacity);
        let calendar = GoogleCalendarClient::new(&config.calendar);
        Self {
            store,
            rooms,
            config: Arc::new(config),
            calendar,
        }
    }
}

/// Implement FromRef for KanbanStore
impl FromRef<AppState> for KanbanStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

/// Implement FromRef for RoomRegistry
impl FromRef<AppState> for RoomRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

/// Implement FromRef for the configuration
impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
