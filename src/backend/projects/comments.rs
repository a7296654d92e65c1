/**
 * Comment Handler
 *
 * `POST .../boards/{board_id}/columns/{column_id}/cards/{card_id}/comments`
 * appends a comment (canComment) and notifies the card's assignees.
 */

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::notifications::notify_many;
use crate::backend::projects::access::require;
use crate::backend::projects::boards::board_mut;
use crate::backend::projects::cards::column_mut;
use crate::backend::projects::types::{required_text, CreateCommentRequest};
use crate::backend::server::state::AppState;
use crate::shared::{Comment, EventPayload, NotificationKind, Permission};

/// Add a comment to a card
///
/// # Errors
///
/// * `400 Bad Request` - Body missing or blank
/// * `403 Forbidden` - Caller lacks canComment
/// * `404 Not Found` - Project, board, column or card missing
pub async fn create_comment(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, column_id, card_id)): ApiPath<(Uuid, Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), BackendError> {
    let body = required_text(request.body.as_deref(), "Comment body is required")?;

    let (comment, card_title, assignees) = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Comment)?;
            let column = column_mut(board_mut(project, board_id)?, column_id)?;
            let card = column
                .card_mut(card_id)
                .ok_or_else(|| BackendError::not_found("Card not found"))?;

            let comment = Comment {
                id: Uuid::new_v4(),
                author_id: user.user_id,
                body,
                created_at: Utc::now(),
            };
            card.comments.push(comment.clone());
            card.record(user.user_id, "commented", json!({ "commentId": comment.id }));
            Ok::<_, BackendError>((comment, card.title.clone(), card.assignees.clone()))
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::CommentCreated {
            board_id,
            column_id,
            card_id,
            comment: comment.clone(),
        },
    );
    notify_many(
        &app_state,
        assignees,
        user.user_id,
        NotificationKind::Comment,
        json!({
            "projectId": project_id,
            "boardId": board_id,
            "cardId": card_id,
            "cardTitle": card_title,
            "commentId": comment.id,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(comment)))
}
