//! Project room gate.
//!
//! A listener's right to a project room is checked when it joins and again
//! for every event, so a member who is removed (or a project that is
//! deleted) stops the stream instead of leaking later changes.

use uuid::Uuid;

use crate::backend::projects::access::require;
use crate::backend::store::KanbanStore;
use crate::shared::{EventPayload, Permission, RealtimeEvent};

/// What a project-room listener does with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Forward,
    /// Deliver this event, then stop listening
    Last,
    /// Stop listening without delivering
    Stop,
}

/// Decide whether `user_id` may still receive `event` from `project_id`'s room
pub async fn project_delivery(
    store: &KanbanStore,
    project_id: Uuid,
    user_id: Uuid,
    event: &RealtimeEvent,
) -> Delivery {
    if matches!(event.payload, EventPayload::ProjectDeleted { .. }) {
        return Delivery::Last;
    }

    let can_view = store
        .with_project(project_id, |project| require(project, user_id, Permission::View).is_ok())
        .await
        .unwrap_or(false);

    match &event.payload {
        _ if can_view => Delivery::Forward,
        EventPayload::MemberRemoved { user_id: removed } if *removed == user_id => Delivery::Last,
        _ => Delivery::Stop,
    }
}
