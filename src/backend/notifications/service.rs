/**
 * Notification Delivery
 *
 * Stores a notification for each recipient and pushes it to the
 * recipient's `user:<id>` room as a `notification` event.
 */

use uuid::Uuid;

use crate::backend::realtime::broadcast::Room;
use crate::backend::server::state::AppState;
use crate::shared::{EventPayload, Notification, NotificationKind, RealtimeEvent};

/// Store and push one notification
pub async fn notify(
    app_state: &AppState,
    user_id: Uuid,
    kind: NotificationKind,
    payload: serde_json::Value,
) -> Notification {
    let notification = Notification::new(user_id, kind, payload);
    app_state.store.push_notification(notification.clone()).await;

    let event = RealtimeEvent::new(EventPayload::Notification {
        notification: notification.clone(),
    });
    let delivered = app_state.rooms.publish(Room::User(user_id), event);
    tracing::debug!(
        "[Notify] {:?} for {} delivered to {} live sessions",
        kind,
        user_id,
        delivered
    );
    notification
}

/// Notify every recipient except the acting user, once each
///
/// # Returns
///
/// Number of notifications created
pub async fn notify_many(
    app_state: &AppState,
    recipients: impl IntoIterator<Item = Uuid>,
    actor_id: Uuid,
    kind: NotificationKind,
    payload: serde_json::Value,
) -> usize {
    let mut seen = Vec::new();
    for user_id in recipients {
        if user_id == actor_id || seen.contains(&user_id) {
            continue;
        }
        seen.push(user_id);
        notify(app_state, user_id, kind, payload.clone()).await;
    }
    seen.len()
}
