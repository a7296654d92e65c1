/**
 * Real-time Event System
 *
 * This module defines the events pushed to connected clients whenever a
 * project changes. Each event has a wire name (`card:moved`, ...) and a
 * typed payload; the envelope adds the project, the acting user and a
 * timestamp.
 *
 * # Wire Format
 *
 * ```json
 * {
 *   "payload": { "event": "card:moved", "data": { "boardId": "...", ... } },
 *   "projectId": "...",
 *   "actorId": "...",
 *   "timestamp": "2025-01-01T00:00:00Z"
 * }
 * ```
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::model::{Board, Card, Column, Comment, MemberView, Notification, Project};
use crate::shared::permissions::Role;

/// Typed payload of a real-time event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum EventPayload {
    #[serde(rename = "project:updated")]
    ProjectUpdated { project: Project },
    #[serde(rename = "project:deleted")]
    ProjectDeleted { project_id: Uuid },
    #[serde(rename = "board:created")]
    BoardCreated { board: Board },
    #[serde(rename = "board:updated")]
    BoardUpdated { board_id: Uuid, name: String },
    #[serde(rename = "board:deleted")]
    BoardDeleted { board_id: Uuid },
    #[serde(rename = "column:created")]
    ColumnCreated { board_id: Uuid, column: Column },
    #[serde(rename = "column:updated")]
    ColumnUpdated {
        board_id: Uuid,
        column_id: Uuid,
        name: String,
        limit: Option<u32>,
    },
    #[serde(rename = "column:moved")]
    ColumnMoved {
        board_id: Uuid,
        column_id: Uuid,
        order: usize,
    },
    #[serde(rename = "column:deleted")]
    ColumnDeleted { board_id: Uuid, column_id: Uuid },
    #[serde(rename = "card:created")]
    CardCreated {
        board_id: Uuid,
        column_id: Uuid,
        card: Card,
    },
    #[serde(rename = "card:updated")]
    CardUpdated {
        board_id: Uuid,
        column_id: Uuid,
        card: Card,
    },
    #[serde(rename = "card:deleted")]
    CardDeleted {
        board_id: Uuid,
        column_id: Uuid,
        card_id: Uuid,
    },
    #[serde(rename = "card:moved")]
    CardMoved {
        board_id: Uuid,
        card_id: Uuid,
        source_column_id: Uuid,
        target_column_id: Uuid,
        order: usize,
        card: Card,
        /// Echo of the client's request id, lets the mover settle its pending move
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<Uuid>,
    },
    #[serde(rename = "comment:created")]
    CommentCreated {
        board_id: Uuid,
        column_id: Uuid,
        card_id: Uuid,
        comment: Comment,
    },
    #[serde(rename = "member:added")]
    MemberAdded { member: MemberView },
    #[serde(rename = "member:updated")]
    MemberUpdated { user_id: Uuid, role: Role },
    #[serde(rename = "member:removed")]
    MemberRemoved { user_id: Uuid },
    #[serde(rename = "notification")]
    Notification { notification: Notification },
}

impl EventPayload {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProjectUpdated { .. } => "project:updated",
            Self::ProjectDeleted { .. } => "project:deleted",
            Self::BoardCreated { .. } => "board:created",
            Self::BoardUpdated { .. } => "board:updated",
            Self::BoardDeleted { .. } => "board:deleted",
            Self::ColumnCreated { .. } => "column:created",
            Self::ColumnUpdated { .. } => "column:updated",
            Self::ColumnMoved { .. } => "column:moved",
            Self::ColumnDeleted { .. } => "column:deleted",
            Self::CardCreated { .. } => "card:created",
            Self::CardUpdated { .. } => "card:updated",
            Self::CardDeleted { .. } => "card:deleted",
            Self::CardMoved { .. } => "card:moved",
            Self::CommentCreated { .. } => "comment:created",
            Self::MemberAdded { .. } => "member:added",
            Self::MemberUpdated { .. } => "member:updated",
            Self::MemberRemoved { .. } => "member:removed",
            Self::Notification { .. } => "notification",
        }
    }
}

/// Real-time event that can be broadcast to all subscribers of a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEvent {
    /// Event name and data
    pub payload: EventPayload,
    /// Project the event belongs to, absent for per-user events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    /// User whose request caused the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    /// Timestamp when event occurred (RFC 3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            project_id: None,
            actor_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an event scoped to a project and caused by `actor_id`
    pub fn for_project(project_id: Uuid, actor_id: Uuid, payload: EventPayload) -> Self {
        Self {
            project_id: Some(project_id),
            actor_id: Some(actor_id),
            ..Self::new(payload)
        }
    }

    /// Wire name of the wrapped payload
    pub fn name(&self) -> &'static str {
        self.payload.name()
    }
}
