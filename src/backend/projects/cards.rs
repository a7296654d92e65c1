/**
 * Card Handlers
 *
 * - `POST .../boards/{board_id}/columns/{column_id}/cards` (canEdit)
 * - `PUT .../boards/{board_id}/columns/{column_id}/cards/{card_id}` (canEdit)
 * - `DELETE .../boards/{board_id}/columns/{column_id}/cards/{card_id}` (canDelete)
 * - `PUT .../boards/{board_id}/cards/{card_id}/move` (canEdit)
 *
 * # Card Movement
 *
 * A move removes the card from its source column, inserts it at the
 * clamped target position and renumbers both columns, all inside one
 * store transaction. The `card:moved` event carries the final order and
 * echoes the client's `requestId` so the mover can settle its optimistic
 * update.
 *
 * # Notifications
 *
 * Newly added assignees receive `task_assigned`; assignees of a moved card
 * receive `task_moved`. The acting user is never notified.
 */

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::notifications::notify_many;
use crate::backend::projects::access::require;
use crate::backend::projects::boards::board_mut;
use crate::backend::projects::types::{
    required_text, CreateCardRequest, MessageResponse, MoveCardRequest, MoveCardResponse,
    UpdateCardRequest,
};
use crate::backend::server::state::AppState;
use crate::shared::ordering::{insert_card, remove_card};
use crate::shared::{
    move_card, Board, Card, CardMove, Column, EventPayload, NotificationKind, Permission, Project,
};

pub(crate) fn column_mut(board: &mut Board, column_id: Uuid) -> Result<&mut Column, BackendError> {
    board
        .column_mut(column_id)
        .ok_or_else(|| BackendError::not_found("Column not found"))
}

/// Reject assignees that are not members of the project
fn check_assignees(project: &Project, assignees: &[Uuid]) -> Result<(), BackendError> {
    if assignees.iter().all(|id| project.member(*id).is_some()) {
        Ok(())
    } else {
        Err(BackendError::bad_request("Assignees must be project members"))
    }
}

/// Assignees in `after` that were not in `before`
fn added_assignees(before: &[Uuid], after: &[Uuid]) -> Vec<Uuid> {
    after.iter().filter(|id| !before.contains(id)).copied().collect()
}

fn card_payload(project_id: Uuid, board_id: Uuid, card: &Card) -> serde_json::Value {
    json!({
        "projectId": project_id,
        "boardId": board_id,
        "cardId": card.id,
        "cardTitle": card.title,
    })
}

/// Create a card (POST .../columns/{column_id}/cards)
///
/// Without explicit assignees the project's default assignee is used.
///
/// # Errors
///
/// * `400 Bad Request` - Title missing, assignee not a member, or column at its limit
/// * `404 Not Found` - Project, board or column missing
pub async fn create_card(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, column_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>), BackendError> {
    let title = required_text(request.title.as_deref(), "Card title is required")?;

    let card = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;

            let assignees = match request.assignees {
                Some(assignees) => assignees,
                None => project
                    .settings
                    .default_assignee
                    .filter(|id| project.member(*id).is_some())
                    .into_iter()
                    .collect(),
            };
            check_assignees(project, &assignees)?;

            let mut card = Card::new(title);
            card.description = request.description.unwrap_or_default();
            card.due_date = request.due_date;
            card.priority = request.priority.unwrap_or_default();
            card.tags = request.tags.unwrap_or_default();
            card.assignees = assignees;
            card.record(user.user_id, "created", json!({ "columnId": column_id }));

            let column = column_mut(board_mut(project, board_id)?, column_id)?;
            let index = insert_card(column, card, request.order)?;
            Ok::<_, BackendError>(column.cards[index].clone())
        })
        .await?;

    tracing::info!("Card {} created in column {}", card.id, column_id);
    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::CardCreated {
            board_id,
            column_id,
            card: card.clone(),
        },
    );
    notify_many(
        &app_state,
        card.assignees.clone(),
        user.user_id,
        NotificationKind::TaskAssigned,
        card_payload(project_id, board_id, &card),
    )
    .await;

    Ok((StatusCode::CREATED, Json(card)))
}

/// Update card fields (PUT .../columns/{column_id}/cards/{card_id})
///
/// Absent fields are kept; `"dueDate": null` clears the due date.
pub async fn update_card(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, column_id, card_id)): ApiPath<(Uuid, Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<UpdateCardRequest>,
) -> Result<Json<Card>, BackendError> {
    let title = match request.title.as_deref() {
        Some(title) => Some(required_text(Some(title), "Card title cannot be empty")?),
        None => None,
    };

    let (card, newly_assigned) = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;
            if let Some(assignees) = &request.assignees {
                check_assignees(project, assignees)?;
            }

            let column = column_mut(board_mut(project, board_id)?, column_id)?;
            let card = column
                .card_mut(card_id)
                .ok_or_else(|| BackendError::not_found("Card not found"))?;

            let mut changed = Vec::new();
            if let Some(title) = title {
                card.title = title;
                changed.push("title");
            }
            if let Some(description) = request.description {
                card.description = description;
                changed.push("description");
            }
            if let Some(due_date) = request.due_date {
                card.due_date = due_date;
                changed.push("dueDate");
            }
            if let Some(priority) = request.priority {
                card.priority = priority;
                changed.push("priority");
            }
            if let Some(status) = request.status {
                card.status = status;
                changed.push("status");
            }
            if let Some(tags) = request.tags {
                card.tags = tags;
                changed.push("tags");
            }
            if let Some(attachments) = request.attachments {
                card.attachments = attachments;
                changed.push("attachments");
            }
            let mut newly_assigned = Vec::new();
            if let Some(assignees) = request.assignees {
                newly_assigned = added_assignees(&card.assignees, &assignees);
                card.assignees = assignees;
                changed.push("assignees");
            }
            card.record(user.user_id, "updated", json!({ "fields": changed }));
            Ok::<_, BackendError>((card.clone(), newly_assigned))
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::CardUpdated {
            board_id,
            column_id,
            card: card.clone(),
        },
    );
    notify_many(
        &app_state,
        newly_assigned,
        user.user_id,
        NotificationKind::TaskAssigned,
        card_payload(project_id, board_id, &card),
    )
    .await;

    Ok(Json(card))
}

/// Delete a card (DELETE .../columns/{column_id}/cards/{card_id})
pub async fn delete_card(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, column_id, card_id)): ApiPath<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, BackendError> {
    app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Delete)?;
            let column = column_mut(board_mut(project, board_id)?, column_id)?;
            remove_card(column, card_id)?;
            Ok::<_, BackendError>(())
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::CardDeleted {
            board_id,
            column_id,
            card_id,
        },
    );
    Ok(Json(MessageResponse::new("Card deleted")))
}

/// Move a card (PUT /projects/{project_id}/boards/{board_id}/cards/{card_id}/move)
///
/// # Errors
///
/// * `400 Bad Request` - A column id is missing, or the target column is full
/// * `403 Forbidden` - Caller lacks canEdit
/// * `404 Not Found` - Project, board, either column, or the card in the source column
///
/// # Example Request
///
/// ```http
/// PUT /projects/{project_id}/boards/{board_id}/cards/{card_id}/move HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "sourceColumnId": "...",
///   "targetColumnId": "...",
///   "newOrder": 0,
///   "requestId": "..."
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// { "message": "Card moved successfully", "card": { "id": "...", "order": 0, ... } }
/// ```
pub async fn move_card_handler(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, card_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<MoveCardRequest>,
) -> Result<Json<MoveCardResponse>, BackendError> {
    let (source_column_id, target_column_id) = match (request.source_column_id, request.target_column_id) {
        (Some(source), Some(target)) => (source, target),
        _ => {
            return Err(BackendError::bad_request(
                "Source and target column IDs are required",
            ))
        }
    };
    let movement = CardMove {
        card_id,
        source_column_id,
        target_column_id,
        new_order: request.new_order,
    };

    let (card, order) = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;
            let board = board_mut(project, board_id)?;
            let outcome = move_card(board, &movement)?;

            let card = column_mut(board, target_column_id)?
                .card_mut(card_id)
                .ok_or_else(|| BackendError::not_found("Card not found"))?;
            card.record(
                user.user_id,
                "moved",
                json!({
                    "fromColumnId": source_column_id,
                    "toColumnId": target_column_id,
                    "order": outcome.order,
                }),
            );
            Ok::<_, BackendError>((card.clone(), outcome.order))
        })
        .await?;

    tracing::info!(
        "Card {} moved {} -> {} at {} by {}",
        card_id,
        source_column_id,
        target_column_id,
        order,
        user.user_id
    );
    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::CardMoved {
            board_id,
            card_id,
            source_column_id,
            target_column_id,
            order,
            card: card.clone(),
            request_id: request.request_id,
        },
    );

    let mut payload = card_payload(project_id, board_id, &card);
    payload["sourceColumnId"] = json!(source_column_id);
    payload["targetColumnId"] = json!(target_column_id);
    notify_many(
        &app_state,
        card.assignees.clone(),
        user.user_id,
        NotificationKind::TaskMoved,
        payload,
    )
    .await;

    Ok(Json(MoveCardResponse {
        message: "Card moved successfully".to_string(),
        card,
    }))
}
