/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load the optional database pool
 * 2. Restore the working set from the database if available
 * 3. Start the idle-room cleanup task
 * 4. Create and configure the router
 *
 * # State Restoration
 *
 * Restoration failures are logged and the server starts empty. Memory is
 * authoritative from then on; the database only receives write-through.
 */

use axum::Router;
use std::time::Duration;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::KanbanStore;

/// Build application state for `config`
///
/// Connects to the database when one is configured and restores the
/// persisted working set into memory.
pub async fn build_state(config: ServerConfig) -> AppState {
    let db_pool = load_database(config.database_url.as_deref()).await;
    let store = KanbanStore::new(db_pool);

    match store.restore().await {
        Ok(stats) => tracing::info!(
            "Restored {} users, {} projects, {} notifications",
            stats.users,
            stats.projects,
            stats.notifications
        ),
        Err(e) => {
            tracing::warn!("Failed to restore state from database (tables may not exist yet): {:?}", e);
            tracing::warn!("Starting with an empty store");
        }
    }

    AppState::new(config, store)
}

/// Spawn the periodic sweep that drops rooms nobody listens to
fn spawn_room_cleanup(app_state: &AppState) {
    let rooms = app_state.rooms.clone();
    let period = Duration::from_secs(app_state.config.room_cleanup_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = rooms.cleanup_inactive_rooms();
            if removed > 0 {
                tracing::debug!("[Realtime] Cleaned up {} inactive rooms", removed);
            }
        }
    });
}

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing database: server continues with in-memory storage
/// - Migration failures: logged but don't prevent startup
/// - State restoration failures: logged but don't prevent startup
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing TaskFlow backend server");

    let app_state = build_state(config).await;
    spawn_room_cleanup(&app_state);

    let app = create_router(app_state);
    tracing::info!("Router configured with periodic room cleanup");
    app
}
