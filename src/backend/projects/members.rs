/**
 * Member Handlers
 *
 * - `GET /projects/{project_id}/members` (canView)
 * - `POST /projects/{project_id}/members` (canManageMembers)
 * - `PATCH /projects/{project_id}/members/{user_id}` (canManageMembers)
 * - `DELETE /projects/{project_id}/members/{user_id}` (canManageMembers)
 * - `POST /projects/{project_id}/members/transfer` (owner only)
 *
 * The owner role is never assigned, changed or removed here; ownership
 * moves only through a transfer, which demotes the old owner to admin.
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
use crate::backend::projects::types::{
    required_text, AddMemberRequest, MessageResponse, TransferOwnershipRequest, UpdateMemberRequest,
};
use crate::backend::server::state::AppState;
use crate::backend::store::KanbanStore;
use crate::shared::{EventPayload, MemberView, Permission, Project, ProjectMember, Role};

/// Members of `project` joined with their profiles
pub async fn member_views(store: &KanbanStore, project: &Project) -> Vec<MemberView> {
    let profiles = store.profiles(project.members.iter().map(|m| m.user_id)).await;
    project
        .members
        .iter()
        .map(|m| MemberView {
            user_id: m.user_id,
            role: m.role,
            joined_at: m.joined_at,
            user: profiles.get(&m.user_id).cloned(),
        })
        .collect()
}

/// Parse a role that may be handed out through the member endpoints
fn assignable_role(role: &str) -> Result<Role, BackendError> {
    let role: Role = role.parse()?;
    if !role.is_assignable() {
        return Err(BackendError::bad_request("Invalid role"));
    }
    Ok(role)
}

/// List members (GET /projects/{project_id}/members)
pub async fn list_members(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<Vec<MemberView>>, BackendError> {
    let (project, _) = load_authorized(&app_state.store, project_id, user.user_id, Permission::View).await?;
    Ok(Json(member_views(&app_state.store, &project).await))
}

/// Add a member by email (POST /projects/{project_id}/members)
///
/// # Errors
///
/// * `400 Bad Request` - Email missing, role invalid, or user already a member
/// * `404 Not Found` - No user with that email
///
/// # Example Request
///
/// ```http
/// POST /projects/{project_id}/members HTTP/1.1
/// Content-Type: application/json
///
/// { "email": "bob@example.com", "role": "editor" }
/// ```
pub async fn add_member(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<Vec<MemberView>>), BackendError> {
    let email = required_text(request.email.as_deref(), "Email is required")?;
    let role = assignable_role(request.role.as_deref().unwrap_or("viewer"))?;

    load_authorized(&app_state.store, project_id, user.user_id, Permission::ManageMembers).await?;

    let invitee = app_state
        .store
        .user_by_email(&email)
        .await
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    let (project, member) = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::ManageMembers)?;
            if project.member(invitee.id).is_some() {
                return Err(BackendError::bad_request("User is already a member"));
            }
            let member = ProjectMember {
                user_id: invitee.id,
                role,
                joined_at: Utc::now(),
            };
            project.members.push(member.clone());
            Ok((project.clone(), member))
        })
        .await?;

    tracing::info!("User {} added to project {} as {}", invitee.id, project_id, role);
    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::MemberAdded {
            member: MemberView {
                user_id: member.user_id,
                role: member.role,
                joined_at: member.joined_at,
                user: Some(invitee.profile()),
            },
        },
    );

    Ok((StatusCode::CREATED, Json(member_views(&app_state.store, &project).await)))
}

/// Change a member's role (PATCH /projects/{project_id}/members/{user_id})
pub async fn update_member(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, member_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<UpdateMemberRequest>,
) -> Result<Json<Vec<MemberView>>, BackendError> {
    let role = required_text(request.role.as_deref(), "Role is required")?;
    let role = assignable_role(&role)?;

    let project = app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::ManageMembers)?;
            let member = project
                .member_mut(member_id)
                .ok_or_else(|| BackendError::not_found("Member not found"))?;
            if member.role == Role::Owner {
                return Err(BackendError::bad_request("Cannot change owner role"));
            }
            member.role = role;
            Ok(project.clone())
        })
        .await?;

    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::MemberUpdated {
            user_id: member_id,
            role,
        },
    );
    Ok(Json(member_views(&app_state.store, &project).await))
}

/// Remove a member (DELETE /projects/{project_id}/members/{user_id})
pub async fn remove_member(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((project_id, member_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, BackendError> {
    app_state
        .store
        .update_project(project_id, |project| {
            require(project, user.user_id, Permission::ManageMembers)?;
            let member = project
                .member(member_id)
                .ok_or_else(|| BackendError::not_found("Member not found"))?;
            if member.role == Role::Owner {
                return Err(BackendError::bad_request("Cannot remove project owner"));
            }
            project.members.retain(|m| m.user_id != member_id);
            Ok(())
        })
        .await?;

    tracing::info!("User {} removed from project {}", member_id, project_id);
    app_state
        .rooms
        .publish_project(project_id, user.user_id, EventPayload::MemberRemoved { user_id: member_id });
    Ok(Json(MessageResponse::new("Member removed successfully")))
}

/// Hand ownership to another member (POST /projects/{project_id}/members/transfer)
///
/// # Errors
///
/// * `400 Bad Request` - `newOwnerId` missing
/// * `403 Forbidden` - Caller is not the owner
/// * `404 Not Found` - New owner is not a member
pub async fn transfer_ownership(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<TransferOwnershipRequest>,
) -> Result<Json<Vec<MemberView>>, BackendError> {
    let new_owner_id = request
        .new_owner_id
        .ok_or_else(|| BackendError::bad_request("New owner ID is required"))?;

    let project = app_state
        .store
        .update_project(project_id, |project| {
            match project.role_of(user.user_id) {
                Some(Role::Owner) => {}
                Some(_) => {
                    return Err(BackendError::forbidden(
                        "Only the project owner can transfer ownership",
                    ))
                }
                None => return Err(BackendError::forbidden("Not a project member")),
            }
            if project.member(new_owner_id).is_none() {
                return Err(BackendError::not_found("New owner not found in project members"));
            }
            if let Some(old) = project.member_mut(user.user_id) {
                old.role = Role::Admin;
            }
            if let Some(new) = project.member_mut(new_owner_id) {
                new.role = Role::Owner;
            }
            Ok(project.clone())
        })
        .await?;

    tracing::info!("Project {} ownership moved from {} to {}", project_id, user.user_id, new_owner_id);
    if new_owner_id != user.user_id {
        app_state.rooms.publish_project(
            project_id,
            user.user_id,
            EventPayload::MemberUpdated {
                user_id: user.user_id,
                role: Role::Admin,
            },
        );
    }
    app_state.rooms.publish_project(
        project_id,
        user.user_id,
        EventPayload::MemberUpdated {
            user_id: new_owner_id,
            role: Role::Owner,
        },
    );
    Ok(Json(member_views(&app_state.store, &project).await))
}
