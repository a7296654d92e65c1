//! Project access checks.
//!
//! Members are judged by their role. Non-members of a `public` project get
//! read access as an implicit viewer; every other non-member is refused.

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::KanbanStore;
use crate::shared::{Permission, Project, Role, Visibility};

/// Check that `user_id` holds `permission` on `project`, returning the effective role
pub fn require(project: &Project, user_id: Uuid, permission: Permission) -> Result<Role, BackendError> {
    match project.role_of(user_id) {
        Some(role) if role.can(permission) => Ok(role),
        Some(role) => {
            tracing::debug!(
                "User {} ({}) lacks {} on project {}",
                user_id,
                role,
                permission,
                project.id
            );
            Err(BackendError::PermissionDenied {
                required: permission,
                role,
            })
        }
        None if project.visibility == Visibility::Public && permission == Permission::View => {
            Ok(Role::Viewer)
        }
        None => Err(BackendError::forbidden("Not a project member")),
    }
}

/// Load a project snapshot and check `permission` against it
pub async fn load_authorized(
    store: &KanbanStore,
    project_id: Uuid,
    user_id: Uuid,
    permission: Permission,
) -> Result<(Project, Role), BackendError> {
    let project = store
        .project(project_id)
        .await
        .ok_or_else(|| BackendError::not_found("Project not found"))?;
    let role = require(&project, user_id, permission)?;
    Ok((project, role))
}
