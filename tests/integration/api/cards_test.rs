//! Card, comment, notification, export and calendar integration tests

use axum::body::to_bytes;
use axum::http::{header, Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{add_member, create_board_fixture, id_of, signup_user, BoardFixture, TestApp, TestUser};

async fn titles(app: &TestApp, owner: &TestUser, fixture: &BoardFixture, column: usize) -> Vec<String> {
    let (_, project) = app.get(&fixture.project_uri(), &owner.token).await;
    project["boards"][0]["columns"][column]["cards"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|c| {
            assert!(c["order"].is_u64());
            c["title"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

async fn create_card(app: &TestApp, user: &TestUser, fixture: &BoardFixture, column: usize, body: Value) -> Value {
    let (status, card) = app.post(&fixture.cards_uri(column), &user.token, body).await;
    assert_eq!(status, StatusCode::CREATED, "create card failed: {card}");
    card
}

#[tokio::test]
async fn test_create_card_appends_and_validates() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let first = create_card(&app, &owner, &fixture, 0, json!({ "title": "One" })).await;
    let second = create_card(&app, &owner, &fixture, 0, json!({ "title": "Two" })).await;
    assert_eq!(first["order"], 0);
    assert_eq!(second["order"], 1);
    assert_eq!(first["activityLog"][0]["action"], "created");

    let front = create_card(&app, &owner, &fixture, 0, json!({ "title": "Zero", "order": 0 })).await;
    assert_eq!(front["order"], 0);
    assert_eq!(titles(&app, &owner, &fixture, 0).await, vec!["Zero", "One", "Two"]);

    let response = app
        .post(&fixture.cards_uri(0), &owner.token, json!({ "title": "" }))
        .await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Card title is required");
}

#[tokio::test]
async fn test_column_limit_blocks_new_cards() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let column_uri = format!("{}/columns/{}", fixture.board_uri(), fixture.columns[1]);
    let (status, _) = app.put(&column_uri, &owner.token, json!({ "limit": 1 })).await;
    assert_eq!(status, StatusCode::OK);

    create_card(&app, &owner, &fixture, 1, json!({ "title": "In progress" })).await;
    let response = app
        .post(&fixture.cards_uri(1), &owner.token, json!({ "title": "Too many" }))
        .await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Column limit reached");

    let waiting = create_card(&app, &owner, &fixture, 0, json!({ "title": "Waiting" })).await;
    let response = app
        .put(
            &format!("{}/cards/{}/move", fixture.board_uri(), id_of(&waiting)),
            &owner.token,
            json!({ "sourceColumnId": fixture.columns[0], "targetColumnId": fixture.columns[1] }),
        )
        .await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Column limit reached");
    assert_eq!(titles(&app, &owner, &fixture, 0).await, vec!["Waiting"]);
}

#[tokio::test]
async fn test_malformed_ids_and_bodies_get_json_errors() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let (status, body) = app.get("/projects/not-a-uuid", &owner.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());

    let a = create_card(&app, &owner, &fixture, 0, json!({ "title": "A" })).await;
    let (status, body) = app
        .put(
            &format!("{}/cards/{}/move", fixture.board_uri(), id_of(&a)),
            &owner.token,
            json!({ "sourceColumnId": "nope", "targetColumnId": fixture.columns[1] }),
        )
        .await;
    assert!(status.is_client_error());
    assert_eq!(body["status"], status.as_u16());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_move_card_between_columns() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let a = create_card(&app, &owner, &fixture, 0, json!({ "title": "A" })).await;
    create_card(&app, &owner, &fixture, 0, json!({ "title": "B" })).await;
    create_card(&app, &owner, &fixture, 2, json!({ "title": "C" })).await;

    let move_uri = format!("{}/cards/{}/move", fixture.board_uri(), id_of(&a));
    let (status, body) = app
        .put(
            &move_uri,
            &owner.token,
            json!({
                "sourceColumnId": fixture.columns[0],
                "targetColumnId": fixture.columns[2],
                "newOrder": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Card moved successfully");
    assert_eq!(body["card"]["order"], 0);

    assert_eq!(titles(&app, &owner, &fixture, 0).await, vec!["B"]);
    assert_eq!(titles(&app, &owner, &fixture, 2).await, vec!["A", "C"]);
}

#[tokio::test]
async fn test_move_card_past_end_appends() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let a = create_card(&app, &owner, &fixture, 0, json!({ "title": "A" })).await;
    create_card(&app, &owner, &fixture, 0, json!({ "title": "B" })).await;

    let move_uri = format!("{}/cards/{}/move", fixture.board_uri(), id_of(&a));
    let (status, body) = app
        .put(
            &move_uri,
            &owner.token,
            json!({
                "sourceColumnId": fixture.columns[0],
                "targetColumnId": fixture.columns[0],
                "newOrder": 99
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["order"], 1);
    assert_eq!(titles(&app, &owner, &fixture, 0).await, vec!["B", "A"]);
}

#[tokio::test]
async fn test_move_card_rejections() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let viewer = signup_user(&app, "Viewer").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &viewer, "viewer").await;

    let a = create_card(&app, &owner, &fixture, 0, json!({ "title": "A" })).await;
    let move_uri = format!("{}/cards/{}/move", fixture.board_uri(), id_of(&a));

    let response = app
        .put(&move_uri, &owner.token, json!({ "sourceColumnId": fixture.columns[0] }))
        .await;
    crate::assert_error_response!(
        response,
        StatusCode::BAD_REQUEST,
        "Source and target column IDs are required"
    );

    let response = app
        .put(
            &move_uri,
            &owner.token,
            json!({ "sourceColumnId": fixture.columns[1], "targetColumnId": fixture.columns[2] }),
        )
        .await;
    crate::assert_error_response!(response, StatusCode::NOT_FOUND, "Card not found in source column");

    let (status, _) = app
        .put(
            &move_uri,
            &viewer.token,
            json!({ "sourceColumnId": fixture.columns[0], "targetColumnId": fixture.columns[2] }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(titles(&app, &owner, &fixture, 0).await, vec!["A"]);
}

#[tokio::test]
async fn test_update_and_delete_card() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let card = create_card(
        &app,
        &owner,
        &fixture,
        0,
        json!({ "title": "Draft", "dueDate": "2030-01-02T09:00:00Z" }),
    )
    .await;
    let card_uri = format!("{}/{}", fixture.cards_uri(0), id_of(&card));

    let (status, updated) = app
        .put(
            &card_uri,
            &owner.token,
            json!({ "title": "Final", "priority": "high", "dueDate": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["dueDate"], Value::Null);

    let (status, body) = app.delete(&card_uri, &owner.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Card deleted");
    assert!(titles(&app, &owner, &fixture, 0).await.is_empty());
}

#[tokio::test]
async fn test_commenter_can_comment_but_not_edit() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let commenter = signup_user(&app, "Commenter").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &commenter, "commenter").await;

    let card = create_card(&app, &owner, &fixture, 0, json!({ "title": "Discuss" })).await;
    let comments_uri = format!("{}/{}/comments", fixture.cards_uri(0), id_of(&card));

    let (status, comment) = app
        .post(&comments_uri, &commenter.token, json!({ "body": "Looks good" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["body"], "Looks good");

    let response = app.post(&comments_uri, &commenter.token, json!({ "body": " " })).await;
    crate::assert_error_response!(response, StatusCode::BAD_REQUEST, "Comment body is required");

    let (status, _) = app
        .post(&fixture.cards_uri(0), &commenter.token, json!({ "title": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_assignment_notifies_assignee() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let editor = signup_user(&app, "Editor").await;
    let stranger = signup_user(&app, "Stranger").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &editor, "editor").await;

    let response = app
        .post(
            &fixture.cards_uri(0),
            &owner.token,
            json!({ "title": "Task", "assignees": [stranger.id] }),
        )
        .await;
    crate::assert_error_response!(
        response,
        StatusCode::BAD_REQUEST,
        "Assignees must be project members"
    );

    create_card(
        &app,
        &owner,
        &fixture,
        0,
        json!({ "title": "Task", "assignees": [editor.id, owner.id] }),
    )
    .await;

    let (status, page) = app.get("/notifications", &editor.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["unreadCount"], 1);
    assert_eq!(page["items"][0]["type"], "task_assigned");

    // The actor is never notified about their own change
    let (_, page) = app.get("/notifications", &owner.token).await;
    assert_eq!(page["total"], 0);

    let notification_id = id_of(&page_item(&app, &editor).await);
    let (status, notification) = app
        .put(&format!("/notifications/{notification_id}/read"), &editor.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notification["read"], true);

    let (status, body) = app.put("/notifications/read-all", &editor.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All notifications marked as read");

    let response = app
        .put(
            &format!("/notifications/{notification_id}/read"),
            &owner.token,
            json!({}),
        )
        .await;
    crate::assert_error_response!(response, StatusCode::NOT_FOUND, "Notification not found");
}

async fn page_item(app: &TestApp, user: &TestUser) -> Value {
    let (_, page) = app.get("/notifications", &user.token).await;
    page["items"][0].clone()
}

#[tokio::test]
async fn test_export_pdf() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;
    create_card(&app, &owner, &fixture, 0, json!({ "title": "Print me" })).await;

    let response = app
        .send(
            Method::GET,
            &format!("{}/export/pdf", fixture.project_uri()),
            Some(&owner.token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap_or_default()
        .to_string();
    crate::assert_contains!(disposition, "Launch.pdf");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_calendar_sync_requires_google() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let response = app
        .post(&format!("{}/calendar/sync", fixture.project_uri()), &owner.token, json!({}))
        .await;
    crate::assert_error_response!(
        response,
        StatusCode::UNAUTHORIZED,
        "Google Calendar not connected. Please authenticate with Google first."
    );
}
