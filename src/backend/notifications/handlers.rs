/**
 * Notification Handlers
 *
 * - `GET /notifications?limit=&offset=` - page of the caller's notifications
 * - `PUT /notifications/{id}/read` - mark one read
 * - `PUT /notifications/read-all` - mark all read
 */

use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiPath, ApiQuery, AuthUser};
use crate::backend::server::state::AppState;
use crate::shared::{Notification, NotificationPage};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageQuery {
    /// Limit clamped to `1..=100`
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllResponse {
    pub message: String,
    pub updated: usize,
}

/// List the caller's notifications (GET /notifications)
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Json<NotificationPage> {
    let page = app_state
        .store
        .notifications(user.user_id, query.limit(), query.offset())
        .await;
    Json(page)
}

/// Mark one notification read (PUT /notifications/{id}/read)
///
/// # Errors
///
/// * `404 Not Found` - Unknown id, or the notification belongs to someone else
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(notification_id): ApiPath<Uuid>,
) -> Result<Json<Notification>, BackendError> {
    app_state
        .store
        .mark_notification_read(user.user_id, notification_id)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Notification not found"))
}

/// Mark all of the caller's notifications read (PUT /notifications/read-all)
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<ReadAllResponse> {
    let updated = app_state.store.mark_all_notifications_read(user.user_id).await;
    tracing::debug!("[Notify] {} marked {} notifications read", user.user_id, updated);
    Json(ReadAllResponse {
        message: "All notifications marked as read".to_string(),
        updated,
    })
}
