/**
 * Calendar Sync Handler
 *
 * `POST /projects/{project_id}/calendar/sync` turns every dated card of a
 * project into a Google Calendar event. Cards that already carry a
 * `calendarEventId` are skipped, so repeated syncs never duplicate events.
 * A failure on one card is reported in the response and does not stop the
 * others.
 */

use axum::{
    extract::State,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::backend::auth::users::AuthProvider;
use crate::backend::calendar::client::CalendarEvent;
use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiPath, AuthUser};
use crate::backend::notifications::notify;
use crate::backend::projects::access::load_authorized;
use crate::backend::server::state::AppState;
use crate::shared::{EventPayload, NotificationKind, Permission, Project};

/// Per-card failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub card_id: Uuid,
    pub card_title: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub message: String,
    pub events_created: usize,
    pub total_cards: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<SyncError>>,
}

/// A dated card found on one of the project's boards
#[derive(Debug, Clone, PartialEq)]
pub struct DatedCard {
    pub board_id: Uuid,
    pub column_id: Uuid,
    pub card_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub calendar_event_id: Option<String>,
}

/// Every card of the project that has a due date, in board order
pub fn dated_cards(project: &Project) -> Vec<DatedCard> {
    let mut found = Vec::new();
    for board in &project.boards {
        for column in &board.columns {
            for card in &column.cards {
                if let Some(due_date) = card.due_date {
                    found.push(DatedCard {
                        board_id: board.id,
                        column_id: column.id,
                        card_id: card.id,
                        title: card.title.clone(),
                        description: card.description.clone(),
                        due_date,
                        calendar_event_id: card.calendar_event_id.clone(),
                    });
                }
            }
        }
    }
    found
}

/// Sync dated cards to the caller's Google Calendar
///
/// # Errors
///
/// * `401 Unauthorized` - No linked Google account with both tokens
/// * `403 Forbidden` - Caller cannot view the project
/// * `404 Not Found` - Project does not exist
pub async fn sync_calendar(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<SyncReport>, BackendError> {
    let (project, _) = load_authorized(&app_state.store, project_id, user.user_id, Permission::View).await?;

    let account = app_state
        .store
        .user(user.user_id)
        .await
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    let access_token = account
        .provider(AuthProvider::Google)
        .filter(|link| link.refresh_token.is_some())
        .and_then(|link| link.access_token.clone())
        .ok_or_else(|| {
            BackendError::unauthorized("Google Calendar not connected. Please authenticate with Google first.")
        })?;

    let cards = dated_cards(&project);
    if cards.is_empty() {
        return Ok(Json(SyncReport {
            message: "No cards with due dates found in this project".to_string(),
            events_created: 0,
            total_cards: 0,
            errors: None,
        }));
    }

    let mut created: Vec<(DatedCard, String)> = Vec::new();
    let mut errors = Vec::new();
    for card in cards.iter().filter(|c| c.calendar_event_id.is_none()) {
        let event = CalendarEvent::for_card(&card.title, &card.description, card.due_date, &app_state.config.calendar);
        match app_state.calendar.create_event(&access_token, &event).await {
            Ok(event_id) => created.push((card.clone(), event_id)),
            Err(e) => {
                tracing::warn!("[Calendar] Event for card {} failed: {}", card.card_id, e);
                errors.push(SyncError {
                    card_id: card.card_id,
                    card_title: card.title.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let mut saved = 0;
    if !created.is_empty() {
        // Cards may have moved or been deleted while the API calls ran
        let (updated, missing) = app_state
            .store
            .update_project::<_, BackendError>(project_id, |draft| {
                let mut updated = Vec::new();
                let mut missing = Vec::new();
                for (dated, event_id) in &created {
                    match draft.locate_card_mut(dated.card_id) {
                        Some((board_id, column_id, card)) => {
                            card.calendar_event_id = Some(event_id.clone());
                            card.updated_at = Utc::now();
                            updated.push((board_id, column_id, card.clone()));
                        }
                        None => missing.push(dated.clone()),
                    }
                }
                Ok((updated, missing))
            })
            .await?;

        for dated in missing {
            tracing::warn!(
                "[Calendar] Card {} disappeared during sync, event id not saved",
                dated.card_id
            );
            errors.push(SyncError {
                card_id: dated.card_id,
                card_title: dated.title,
                error: "Card was deleted before its event id could be saved".to_string(),
            });
        }

        saved = updated.len();
        for (board_id, column_id, card) in updated {
            app_state.rooms.publish_project(
                project_id,
                user.user_id,
                EventPayload::CardUpdated {
                    board_id,
                    column_id,
                    card,
                },
            );
        }
    }

    if saved > 0 {
        notify(
            &app_state,
            user.user_id,
            NotificationKind::CalendarEvent,
            json!({
                "projectId": project_id,
                "projectName": project.name,
                "eventsCreated": saved,
            }),
        )
        .await;
    }

    tracing::info!(
        "[Calendar] Project {}: {} events created, {} failures",
        project_id,
        saved,
        errors.len()
    );

    Ok(Json(SyncReport {
        message: format!("Successfully synced {} cards to Google Calendar", saved),
        events_created: saved,
        total_cards: cards.len(),
        errors: (!errors.is_empty()).then_some(errors),
    }))
}
