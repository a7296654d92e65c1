/**
 * Export Handler
 *
 * `GET /projects/{project_id}/export/pdf` returns a printable summary of
 * the project as a PDF attachment.
 */

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::export::layout::{export_filename, layout_project};
use crate::backend::export::render::render_pdf;
use crate::backend::middleware::{ApiPath, AuthUser};
use crate::backend::projects::access::load_authorized;
use crate::backend::projects::members::member_views;
use crate::backend::server::state::AppState;
use crate::shared::Permission;

/// Export a project as PDF (GET /projects/{project_id}/export/pdf)
///
/// # Errors
///
/// * `403 Forbidden` - Caller cannot view the project
/// * `404 Not Found` - Project does not exist
/// * `500 Internal Server Error` - Rendering failed
pub async fn export_pdf(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Response, BackendError> {
    let (project, _) = load_authorized(&app_state.store, project_id, user.user_id, Permission::View).await?;
    let members = member_views(&app_state.store, &project).await;

    let layout = layout_project(&project, &members);
    let pages = layout.pages.len();
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&layout))
        .await
        .map_err(|e| BackendError::export(format!("render task: {}", e)))??;

    tracing::info!("Exported project {} ({} pages, {} bytes)", project_id, pages, bytes.len());
    let disposition = format!("attachment; filename=\"{}\"", export_filename(&project.name));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
