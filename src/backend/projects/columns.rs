/**
 * Column Handlers
 *
 * - `POST /projects/{project_id}/boards/{board_id}/columns` (canEdit)
 * - `PUT /projects/{project_id}/boards/{board_id}/columns/{column_id}` (canEdit)
 * - `DELETE /projects/{project_id}/boards/{board_id}/columns/{column_id}` (canDelete)
 *
 * Column positions follow the same clamping rules as card positions.
 */

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::projects::access::require;
use crate::backend::projects::boards::board_mut;
use crate::backend::projects::types::{
    required_text, CreateColumnRequest, MessageResponse, UpdateColumnRequest,
};
use crate::backend::server::state::AppState;
use crate::shared::ordering::{insert_column, move_column, remove_column};
use crate::shared::{Column, EventPayload, Permission};

/// `0` means no limit
fn normalize_limit(limit: Option<u32>) -> Option<u32> {
    limit.filter(|l| *l > 0)
}

/// Add a column (POST /projects/{project_id}/boards/{board_id}/columns)
///
/// # Example Request
///
/// ```http
/// POST /projects/{project_id}/boards/{board_id}/columns HTTP/1.1
/// Content-Type: application/json
///
/// { "name": "Doing", "order": 1, "limit": 3 }
/// ```
pub async fn create_column(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<CreateColumnRequest>,
) -> Result<(StatusCode, Json<Column>), BackendError> {
    let name = required_text(request.name.as_deref(), "Column name is required")?;

    let column = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;
            let board = board_mut(project, board_id)?;
            let mut column = Column::new(name);
            column.limit = normalize_limit(request.limit);
            let index = insert_column(board, column, request.order);
            Ok::<_, BackendError>(board.columns[index].clone())
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::ColumnCreated {
            board_id,
            column: column.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(column)))
}

/// Rename, re-limit or reposition a column
/// (PUT /projects/{project_id}/boards/{board_id}/columns/{column_id})
///
/// Broadcasts `column:updated`, plus `column:moved` when `order` was given.
pub async fn update_column(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, column_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<UpdateColumnRequest>,
) -> Result<Json<Column>, BackendError> {
    let name = match request.name.as_deref() {
        Some(name) => Some(required_text(Some(name), "Column name cannot be empty")?),
        None => None,
    };

    let (column, moved_to) = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;
            let board = board_mut(project, board_id)?;
            let column = board
                .column_mut(column_id)
                .ok_or_else(|| BackendError::not_found("Column not found"))?;
            if let Some(name) = name {
                column.name = name;
            }
            if request.limit.is_some() {
                column.limit = normalize_limit(request.limit);
            }
            column.updated_at = Utc::now();

            let moved_to = match request.order {
                Some(order) => Some(move_column(board, column_id, order)?),
                None => None,
            };
            let column = board
                .column(column_id)
                .cloned()
                .ok_or_else(|| BackendError::not_found("Column not found"))?;
            Ok::<_, BackendError>((column, moved_to))
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::ColumnUpdated {
            board_id,
            column_id,
            name: column.name.clone(),
            limit: column.limit,
        },
    );
    if let Some(order) = moved_to {
        app_state.rooms.publish_project(
            project_id,
            user.user_id,
            EventPayload::ColumnMoved {
                board_id,
                column_id,
                order,
            },
        );
    }
    Ok(Json(column))
}

/// Delete a column and its cards
pub async fn delete_column(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id, column_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, BackendError> {
    app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Delete)?;
            let board = board_mut(project, board_id)?;
            remove_column(board, column_id)?;
            Ok::<_, BackendError>(())
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::ColumnDeleted { board_id, column_id },
    );
    Ok(Json(MessageResponse::new("Column deleted")))
}
