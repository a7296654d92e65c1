//! Project, member and board API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{add_member, create_board_fixture, id_of, signup_user, TestApp};

#[tokio::test]
async fn test_create_and_list_projects() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;

    let (status, project) = app
        .post("/projects", &owner.token, json!({ "name": "Launch", "description": "Q3" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["visibility"], "private");
    assert_eq!(project["members"][0]["role"], "owner");
    assert_eq!(project["members"][0]["userId"], owner.id.to_string());

    let (status, projects) = app.get("/projects", &owner.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects.as_array().map(Vec::len), Some(1));

    let stranger = signup_user(&app, "Stranger").await;
    let (_, projects) = app.get("/projects", &stranger.token).await;
    assert_eq!(projects, json!([]));
}

#[tokio::test]
async fn test_create_project_requires_name() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;

    let response = app.post("/projects", &owner.token, json!({ "name": "  " })).await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Name is required");
}

#[tokio::test]
async fn test_private_project_hidden_from_non_members() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let stranger = signup_user(&app, "Stranger").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let response = app.get(&fixture.project_uri(), &stranger.token).await;
    crate::assert_error_response!(response, StatusCode::FORBIDDEN, "Not a project member");

    let (status, _) = app
        .put(&fixture.project_uri(), &owner.token, json!({ "visibility": "public" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&fixture.project_uri(), &stranger.token).await;
    assert_eq!(status, StatusCode::OK);

    // Public read access does not extend to writes
    let (status, _) = app
        .post(&fixture.cards_uri(0), &stranger.token, json!({ "title": "Sneaky" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_project() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;

    let response = app
        .get(&format!("/projects/{}", uuid::Uuid::new_v4()), &owner.token)
        .await;
    crate::assert_error_response!(response, StatusCode::NOT_FOUND, "Project not found");
}

#[tokio::test]
async fn test_viewer_cannot_update_project() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let viewer = signup_user(&app, "Viewer").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &viewer, "viewer").await;

    let (status, body) = app
        .put(&fixture.project_uri(), &viewer.token, json!({ "name": "Renamed" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["yourRole"], "viewer");
}

#[tokio::test]
async fn test_member_management() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let editor = signup_user(&app, "Editor").await;
    let fixture = create_board_fixture(&app, &owner).await;
    let members_uri = format!("{}/members", fixture.project_uri());

    add_member(&app, &owner, &fixture, &editor, "editor").await;

    let response = app
        .post(&members_uri, &owner.token, json!({ "email": editor.email }))
        .await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "User is already a member");

    let response = app
        .post(&members_uri, &owner.token, json!({ "email": "ghost@example.com" }))
        .await;
    crate::assert_error_response!(response, StatusCode::NOT_FOUND, "User not found");

    let (status, members) = app.get(&members_uri, &editor.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().map(Vec::len), Some(2));
    assert!(members
        .as_array()
        .into_iter()
        .flatten()
        .any(|m| m["user"]["email"] == editor.email.as_str()));

    let member_uri = format!("{members_uri}/{}", editor.id);
    let (status, _) = app.patch(&member_uri, &owner.token, json!({ "role": "admin" })).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .patch(&member_uri, &owner.token, json!({ "role": "owner" }))
        .await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Invalid role");

    let response = app
        .delete(&format!("{members_uri}/{}", owner.id), &editor.token)
        .await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Cannot remove project owner");

    let (status, body) = app.delete(&member_uri, &owner.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member removed successfully");

    let (status, _) = app.get(&fixture.project_uri(), &editor.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_transfer_ownership() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let admin = signup_user(&app, "Admin").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &admin, "admin").await;
    let transfer_uri = format!("{}/members/transfer", fixture.project_uri());

    let response = app
        .post(&transfer_uri, &admin.token, json!({ "newOwnerId": admin.id }))
        .await;
    crate::assert_error_response!(
        response,
        StatusCode::FORBIDDEN,
        "Only the project owner can transfer ownership"
    );

    let (status, _) = app
        .post(&transfer_uri, &owner.token, json!({ "newOwnerId": admin.id }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, project) = app.get(&fixture.project_uri(), &owner.token).await;
    let role_of = |id: uuid::Uuid| {
        project["members"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|m| m["userId"] == id.to_string())
            .map(|m| m["role"].clone())
    };
    assert_eq!(role_of(admin.id), Some(json!("owner")));
    assert_eq!(role_of(owner.id), Some(json!("admin")));
}

#[tokio::test]
async fn test_board_lifecycle() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;
    let boards_uri = format!("{}/boards", fixture.project_uri());

    let response = app.post(&boards_uri, &owner.token, json!({})).await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Board name is required");

    let (status, board) = app
        .put(&fixture.board_uri(), &owner.token, json!({ "name": "Sprint 2" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["name"], "Sprint 2");
    let names: Vec<_> = board["columns"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|c| (c["name"].clone(), c["order"].clone()))
        .collect();
    assert_eq!(
        names,
        vec![(json!("Todo"), json!(0)), (json!("Doing"), json!(1)), (json!("Done"), json!(2))]
    );

    let (status, _) = app.delete(&fixture.board_uri(), &owner.token).await;
    assert_eq!(status, StatusCode::OK);
    let (_, boards) = app.get(&boards_uri, &owner.token).await;
    assert_eq!(boards, json!([]));
}

#[tokio::test]
async fn test_column_reorder() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let done_uri = format!("{}/columns/{}", fixture.board_uri(), fixture.columns[2]);
    let (status, column) = app
        .put(&done_uri, &owner.token, json!({ "order": 0, "limit": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(column["order"], 0);
    assert_eq!(column["limit"], 3);

    let (_, boards) = app
        .get(&format!("{}/boards", fixture.project_uri()), &owner.token)
        .await;
    let order: Vec<_> = boards[0]["columns"]
        .as_array()
        .into_iter()
        .flatten()
        .map(id_of)
        .collect();
    assert_eq!(
        order,
        vec![fixture.columns[2].clone(), fixture.columns[0].clone(), fixture.columns[1].clone()]
    );
}

#[tokio::test]
async fn test_delete_project_requires_owner() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let admin = signup_user(&app, "Admin").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &admin, "admin").await;

    let (status, _) = app.delete(&fixture.project_uri(), &admin.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&fixture.project_uri(), &owner.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted");

    let (status, _) = app.get(&fixture.project_uri(), &owner.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
