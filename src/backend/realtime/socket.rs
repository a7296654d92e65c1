/**
 * WebSocket Handler
 *
 * This module implements the bidirectional real-time channel at `GET /ws`.
 * The handshake is authenticated with the same JWT as the REST API, passed
 * either as `?token=` or as a bearer `Authorization` header.
 *
 * # Rooms
 *
 * Every socket joins its own `user:<id>` room on connect and may then join
 * any number of `project:<id>` rooms it can view.
 *
 * # Frames
 *
 * Client → server:
 * - `{"type":"join:project","projectId":"..."}`
 * - `{"type":"leave:project","projectId":"..."}`
 * - `{"type":"ping"}`
 *
 * Server → client:
 * - `{"type":"joined","projectId":"..."}` / `{"type":"left","projectId":"..."}`
 * - `{"type":"pong"}`
 * - `{"type":"error","message":"..."}`
 * - `{"type":"event","event":{...}}` wrapping a real-time event envelope
 *
 * # Tasks
 *
 * A single writer task owns the socket sink and drains an mpsc queue. Each
 * joined room gets a forwarder task that copies broadcast events into that
 * queue. All tasks are aborted when the socket closes.
 *
 * A project forwarder re-checks view access for every event. When access
 * is gone it sends a final `left` frame and exits; the client may re-join
 * if access is later restored.
 */

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{authenticate, bearer_token, ApiQuery, AuthenticatedUser};
use crate::backend::projects::access::load_authorized;
use crate::backend::realtime::broadcast::Room;
use crate::backend::realtime::gate::{project_delivery, Delivery};
use crate::backend::server::state::AppState;
use crate::shared::{Permission, RealtimeEvent};

/// Outbound queue depth per socket
const OUTBOUND_BUFFER: usize = 256;

#[derive(Debug, Default, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Frame sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "join:project", rename_all = "camelCase")]
    JoinProject { project_id: Uuid },
    #[serde(rename = "leave:project", rename_all = "camelCase")]
    LeaveProject { project_id: Uuid },
    #[serde(rename = "ping")]
    Ping,
}

/// Frame sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    #[serde(rename_all = "camelCase")]
    Joined { project_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Left { project_id: Uuid },
    Pong,
    Error { message: String },
    Event { event: RealtimeEvent },
}

impl ServerFrame {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Handle the WebSocket handshake (GET /ws)
///
/// # Errors
///
/// * `401 Unauthorized` - Token missing, invalid, or for an unknown user
///
/// The token is checked before the upgrade headers, so an unauthenticated
/// plain GET answers 401 rather than 426.
pub async fn handle_socket_upgrade(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<SocketQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, BackendError> {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| BackendError::unauthorized("Authentication error"))?;

    let user = authenticate(&app_state, token).await?;
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!("[Socket] Upgrade rejected for {}: {}", user.user_id, rejection);
            return Ok(rejection.into_response());
        }
    };
    tracing::info!("[Socket] User {} connected", user.user_id);

    Ok(ws.on_upgrade(move |socket| run_socket(socket, app_state, user)))
}

/// Spawn a task that copies events from `room` into the outbound queue
fn spawn_forwarder(
    app_state: &AppState,
    user_id: Uuid,
    room: Room,
    out: mpsc::Sender<ServerFrame>,
) -> JoinHandle<()> {
    let mut rx = app_state.rooms.subscribe(room);
    let store = app_state.store.clone();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Socket] {} forwarder lagged, skipped {} events", room, skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let Room::Project(project_id) = room else {
                if out.send(ServerFrame::Event { event }).await.is_err() {
                    break;
                }
                continue;
            };

            let delivery = project_delivery(&store, project_id, user_id, &event).await;
            if delivery != Delivery::Stop && out.send(ServerFrame::Event { event }).await.is_err() {
                break;
            }
            if delivery != Delivery::Forward {
                tracing::info!("[Socket] User {} lost access to {}, leaving", user_id, room);
                let _ = out.send(ServerFrame::Left { project_id }).await;
                break;
            }
        }
    })
}

/// Connection state of one socket
struct Session {
    app_state: AppState,
    user: AuthenticatedUser,
    out: mpsc::Sender<ServerFrame>,
    forwarders: HashMap<Room, JoinHandle<()>>,
}

impl Session {
    fn join(&mut self, room: Room) {
        // A forwarder that ended on lost access is replaced on re-join
        let active = self.forwarders.get(&room).is_some_and(|h| !h.is_finished());
        if !active {
            let handle = spawn_forwarder(&self.app_state, self.user.user_id, room, self.out.clone());
            self.forwarders.insert(room, handle);
        }
    }

    fn leave(&mut self, room: Room) {
        if let Some(handle) = self.forwarders.remove(&room) {
            handle.abort();
        }
    }

    async fn handle_frame(&mut self, frame: ClientFrame) -> ServerFrame {
        match frame {
            ClientFrame::JoinProject { project_id } => {
                match load_authorized(&self.app_state.store, project_id, self.user.user_id, Permission::View).await {
                    Ok(_) => {
                        self.join(Room::Project(project_id));
                        tracing::debug!("[Socket] User {} joined project {}", self.user.user_id, project_id);
                        ServerFrame::Joined { project_id }
                    }
                    Err(e) => {
                        tracing::warn!(
                            "[Socket] User {} refused project {}: {}",
                            self.user.user_id,
                            project_id,
                            e.message()
                        );
                        ServerFrame::error(e.message())
                    }
                }
            }
            ClientFrame::LeaveProject { project_id } => {
                self.leave(Room::Project(project_id));
                ServerFrame::Left { project_id }
            }
            ClientFrame::Ping => ServerFrame::Pong,
        }
    }

    fn close(self) {
        for (_, handle) in self.forwarders {
            handle.abort();
        }
    }
}

async fn run_socket(socket: WebSocket, app_state: AppState, user: AuthenticatedUser) {
    let user_id = user.user_id;
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(OUTBOUND_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Socket] Failed to serialize frame: {:?}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let mut session = Session {
        app_state,
        user,
        out: out_tx.clone(),
        forwarders: HashMap::new(),
    };
    session.join(Room::User(user_id));

    while let Some(message) = stream.next().await {
        let reply = match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(text.as_str()) {
                Ok(frame) => session.handle_frame(frame).await,
                Err(e) => {
                    tracing::debug!("[Socket] Bad frame from {}: {}", user_id, e);
                    ServerFrame::error("Invalid message")
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("[Socket] Receive error for {}: {:?}", user_id, e);
                break;
            }
        };
        if out_tx.send(reply).await.is_err() {
            break;
        }
    }

    session.close();
    writer.abort();
    tracing::info!("[Socket] User {} disconnected", user_id);
}
