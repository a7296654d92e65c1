/**
 * Project Handlers
 *
 * - `GET /projects` - projects the caller belongs to
 * - `POST /projects` - create a project owned by the caller
 * - `GET /projects/{project_id}` - one project (canView)
 * - `PUT /projects/{project_id}` - rename, describe, change visibility or settings (canManageProject)
 * - `DELETE /projects/{project_id}` - delete (canManageProject)
 */

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::projects::access::{load_authorized, require};
use crate::backend::projects::types::{
    required_text, CreateProjectRequest, MessageResponse, UpdateProjectRequest,
};
use crate::backend::server::state::AppState;
use crate::shared::{EventPayload, Permission, Project};

/// List the caller's projects (GET /projects)
pub async fn list_projects(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<Vec<Project>> {
    Json(app_state.store.projects_for(user.user_id).await)
}

/// Create a project (POST /projects)
///
/// The caller becomes the owner and only member.
///
/// # Errors
///
/// * `400 Bad Request` - Name missing or blank
///
/// # Example Request
///
/// ```http
/// POST /projects HTTP/1.1
/// Authorization: Bearer eyJ...
/// Content-Type: application/json
///
/// { "name": "Launch", "description": "Q3 launch", "visibility": "team" }
/// ```
pub async fn create_project(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), BackendError> {
    let name = required_text(request.name.as_deref(), "Name is required")?;

    let mut project = Project::new(name, request.description.unwrap_or_default(), user.user_id);
    if let Some(visibility) = request.visibility {
        project.visibility = visibility;
    }

    let project = app_state.store.insert_project(project).await;
    tracing::info!("Project {} created by {}", project.id, user.user_id);
    Ok((StatusCode::CREATED, Json(project)))
}

/// Get one project (GET /projects/{project_id})
pub async fn get_project(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<Project>, BackendError> {
    let (project, _) = load_authorized(&app_state.store, project_id, user.user_id, Permission::View).await?;
    Ok(Json(project))
}

/// Update project metadata (PUT /projects/{project_id})
///
/// Absent fields are left unchanged.
pub async fn update_project(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateProjectRequest>,
) -> Result<Json<Project>, BackendError> {
    let name = match request.name.as_deref() {
        Some(name) => Some(required_text(Some(name), "Name cannot be empty")?),
        None => None,
    };

    let project = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::ManageProject)?;
            if let Some(name) = name {
                project.name = name;
            }
            if let Some(description) = request.description {
                project.description = description;
            }
            if let Some(visibility) = request.visibility {
                project.visibility = visibility;
            }
            if let Some(settings) = request.settings {
                project.settings = settings;
            }
            project.touch();
            Ok::<_, BackendError>(project.clone())
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::ProjectUpdated {
            project: project.clone(),
        },
    );
    Ok(Json(project))
}

/// Delete a project (DELETE /projects/{project_id})
pub async fn delete_project(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, BackendError> {
    app_state
        .store
        .delete_project(project_id, |project| {
            require(project, user.user_id, Permission::ManageProject).map(|_| ())
        })
        .await?;

    tracing::info!("Project {} deleted by {}", project_id, user.user_id);
    app_state
        .rooms
        .publish_project(project_id, user.user_id, EventPayload::ProjectDeleted { project_id });
    Ok(Json(MessageResponse::new("Project deleted")))
}
