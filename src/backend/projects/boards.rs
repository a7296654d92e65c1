/**
 * Board Handlers
 *
 * - `GET /projects/{project_id}/boards` (canView)
 * - `POST /projects/{project_id}/boards` (canEdit)
 * - `PUT /projects/{project_id}/boards/{board_id}` (canEdit)
 * - `DELETE /projects/{project_id}/boards/{board_id}` (canDelete)
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
use crate::backend::projects::access::{load_authorized, require};
use crate::backend::projects::types::{required_text, BoardRequest, MessageResponse};
use crate::backend::server::state::AppState;
use crate::shared::{Board, EventPayload, Permission, Project};

/// Look a board up for mutation
pub fn board_mut(project: &mut Project, board_id: Uuid) -> Result<&mut Board, BackendError> {
    project
        .board_mut(board_id)
        .ok_or_else(|| BackendError::not_found("Board not found"))
}

/// List boards (GET /projects/{project_id}/boards)
pub async fn list_boards(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Board>>, BackendError> {
    let (project, _) = load_authorized(&app_state.store, project_id, user.user_id, Permission::View).await?;
    Ok(Json(project.boards))
}

/// Create a board (POST /projects/{project_id}/boards)
pub async fn create_board(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<BoardRequest>,
) -> Result<(StatusCode, Json<Board>), BackendError> {
    let name = required_text(request.name.as_deref(), "Board name is required")?;

    let board = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;
            let board = Board::new(name);
            project.boards.push(board.clone());
            Ok::<_, BackendError>(board)
        })
        .await?;

    tracing::info!("Board {} created in project {}", board.id, project_id);
    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::BoardCreated { board: board.clone() },
    );
    Ok((StatusCode::CREATED, Json(board)))
}

/// Rename a board (PUT /projects/{project_id}/boards/{board_id})
pub async fn update_board(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<BoardRequest>,
) -> Result<Json<Board>, BackendError> {
    let name = required_text(request.name.as_deref(), "Board name is required")?;

    let board = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Edit)?;
            let board = board_mut(project, board_id)?;
            board.name = name;
            board.updated_at = Utc::now();
            Ok::<_, BackendError>(board.clone())
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::BoardUpdated {
            board_id,
            name: board.name.clone(),
        },
    );
    Ok(Json(board))
}

/// Delete a board with all of its columns and cards
pub async fn delete_board(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, board_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, BackendError> {
    app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::Delete)?;
            board_mut(project, board_id)?;
            project.boards.retain(|b| b.id != board_id);
            Ok::<_, BackendError>(())
        })
        .await?;

    tracing::info!("Board {} deleted from project {}", board_id, project_id);
    app_state
        .rooms
        .publish_project(project_id, user.user_id, EventPayload::BoardDeleted { board_id });
    Ok(Json(MessageResponse::new("Board deleted")))
}
