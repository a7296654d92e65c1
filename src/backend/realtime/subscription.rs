/**
 * Real-time Subscription Handler
 *
 * This module implements the Server-Sent Events (SSE) subscription handler
 * for `GET /projects/{project_id}/events`. It streams every event of one
 * project to clients that prefer plain HTTP over a WebSocket.
 *
 * # Event Filtering
 *
 * Clients can filter events by name using the `types` query parameter:
 * - `?types=card:moved,card:created` - Only card moves and creations
 * - No parameter - All events of the project
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - Lagged events are logged and skipped, the stream stays open
 * - View access is re-checked per event; the stream ends after the caller's
 *   own `member:removed` or a `project:deleted`
 */

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiPath, ApiQuery, AuthUser};
use crate::backend::projects::access::load_authorized;
use crate::backend::realtime::broadcast::Room;
use crate::backend::realtime::gate::{project_delivery, Delivery};
use crate::backend::server::state::AppState;
use crate::backend::store::KanbanStore;
use crate::shared::{Permission, RealtimeEvent};

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    /// Comma-separated event names
    pub types: Option<String>,
}

/// Parse the `types` filter; `None` means every event
pub fn parse_type_filter(types: Option<&str>) -> Option<Vec<String>> {
    types
        .map(|types_str| {
            types_str
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
}

/// Unfold state of one SSE stream
struct Listener {
    rx: broadcast::Receiver<RealtimeEvent>,
    filter: Option<Vec<String>>,
    store: KanbanStore,
    project_id: Uuid,
    user_id: Uuid,
    finished: bool,
}

impl Listener {
    async fn next_event(&mut self) -> Option<Event> {
        while !self.finished {
            let event = match self.rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] SSE receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Room closed, ending stream");
                    return None;
                }
            };

            match project_delivery(&self.store, self.project_id, self.user_id, &event).await {
                Delivery::Forward => {}
                Delivery::Last => self.finished = true,
                Delivery::Stop => {
                    self.finished = true;
                    continue;
                }
            }
            if !passes(&self.filter, &event) {
                continue;
            }
            match serde_json::to_string(&event) {
                Ok(data) => return Some(Event::default().event(event.name()).data(data)),
                Err(e) => tracing::error!("[Realtime] Failed to serialize event: {:?}", e),
            }
        }
        tracing::info!(
            "[Realtime] User {} lost access to project {}, ending SSE",
            self.user_id,
            self.project_id
        );
        None
    }
}

fn passes(filter: &Option<Vec<String>>, event: &RealtimeEvent) -> bool {
    match filter {
        Some(names) => names.iter().any(|n| n == event.name()),
        None => true,
    }
}

/// Handle project event subscription (GET /projects/{project_id}/events)
///
/// # Returns
///
/// Server-Sent Events stream; each SSE event is named after the real-time
/// event (`card:moved`, ...) and carries the JSON envelope as data.
///
/// # Errors
///
/// * `403 Forbidden` - Caller cannot view the project
/// * `404 Not Found` - Project does not exist
///
/// # Example Response
///
/// ```http
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
///
/// event: card:moved
/// data: {"payload":{"event":"card:moved","data":{...}},"projectId":"...","timestamp":"..."}
/// ```
pub async fn handle_project_subscription(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    load_authorized(&app_state.store, project_id, user.user_id, Permission::View).await?;

    let filter = parse_type_filter(query.types.as_deref());
    match &filter {
        Some(types) => tracing::info!("[Realtime] SSE for project {} filtered by {:?}", project_id, types),
        None => tracing::info!("[Realtime] SSE for project {} (all events)", project_id),
    }

    let listener = Listener {
        rx: app_state.rooms.subscribe(Room::Project(project_id)),
        filter,
        store: app_state.store.clone(),
        project_id,
        user_id: user.user_id,
        finished: false,
    };

    let stream = stream::unfold(listener, |mut listener| async move {
        let event = listener.next_event().await?;
        Some((Ok(event), listener))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
