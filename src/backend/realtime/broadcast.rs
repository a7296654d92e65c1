/**
 * Real-time Event Broadcasting
 *
 * This module provides the room registry used to fan events out to every
 * connected client. Each room owns a `tokio::sync::broadcast` channel:
 *
 * - `project:<id>` carries every change made to a project
 * - `user:<id>` carries notifications addressed to one user
 *
 * Channels are created on first subscription and swept once nobody listens.
 * Publishing to a room without listeners is a no-op, not an error.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::{EventPayload, RealtimeEvent};

/// Real-time update event broadcast
///
/// A broadcast sender for real-time events. It can be cloned and shared
/// across handlers.
pub type RealtimeEventBroadcast = broadcast::Sender<RealtimeEvent>;

/// A broadcast audience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Project(Uuid),
    User(Uuid),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Project(id) => write!(f, "project:{}", id),
            Room::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Broadcast a real-time event to all subscribers
///
/// # Returns
///
/// Number of active subscribers that received the event (0 if no subscribers)
pub fn broadcast_event(broadcast_tx: &RealtimeEventBroadcast, event: RealtimeEvent) -> usize {
    let name = event.name();
    match broadcast_tx.send(event) {
        Ok(subscriber_count) => {
            tracing::debug!("[Realtime] {} broadcast to {} subscribers", name, subscriber_count);
            subscriber_count
        }
        Err(_) => {
            tracing::debug!("[Realtime] No subscribers to receive {}", name);
            0
        }
    }
}

/// Per-room broadcast channels
#[derive(Clone)]
pub struct RoomRegistry {
    channels: Arc<Mutex<HashMap<Room, RealtimeEventBroadcast>>>,
    capacity: usize,
}

impl RoomRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<Room, RealtimeEventBroadcast>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get or create the sender for a room
    pub fn sender(&self, room: Room) -> RealtimeEventBroadcast {
        self.channels()
            .entry(room)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Subscribe to a room, creating it if needed
    pub fn subscribe(&self, room: Room) -> broadcast::Receiver<RealtimeEvent> {
        self.sender(room).subscribe()
    }

    /// Publish to a room, returning how many receivers got the event
    pub fn publish(&self, room: Room, event: RealtimeEvent) -> usize {
        let sender = self.channels().get(&room).cloned();
        match sender {
            Some(sender) => broadcast_event(&sender, event),
            None => {
                tracing::trace!("[Realtime] {} has no listeners, dropping {}", room, event.name());
                0
            }
        }
    }

    /// Publish a project change caused by `actor_id` to the project's room
    pub fn publish_project(&self, project_id: Uuid, actor_id: Uuid, payload: EventPayload) -> usize {
        self.publish(
            Room::Project(project_id),
            RealtimeEvent::for_project(project_id, actor_id, payload),
        )
    }

    /// Drop rooms with no receivers, returning how many were removed
    pub fn cleanup_inactive_rooms(&self) -> usize {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    /// Get subscriber count for a room
    pub fn subscriber_count(&self, room: Room) -> usize {
        self.channels()
            .get(&room)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.channels().len()
    }
}
