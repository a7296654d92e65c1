//! Real-time delivery tests
//!
//! Mutations made over HTTP must reach subscribers of the project room, and
//! notifications must reach the recipient's user room.

use axum::body::to_bytes;
use axum::http::{header, Method, StatusCode};
use axum::response::Response;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use uuid::Uuid;

use taskflow::backend::realtime::Room;
use taskflow::shared::{EventPayload, RealtimeEvent};

use crate::common::{add_member, create_board_fixture, id_of, signup_user, TestApp};

async fn next_event(rx: &mut Receiver<RealtimeEvent>) -> RealtimeEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event within timeout")
        .expect("channel open")
}

/// Read an SSE body to its end; panics if the stream stays open
async fn drain_stream(response: Response) -> String {
    let bytes = tokio::time::timeout(Duration::from_secs(2), to_bytes(response.into_body(), usize::MAX))
        .await
        .expect("stream ended")
        .expect("body is readable");
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_card_move_reaches_project_room_with_request_id() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;
    let project_id: Uuid = fixture.project_id.parse().unwrap();

    let (_, card) = app
        .post(&fixture.cards_uri(0), &owner.token, json!({ "title": "Move me" }))
        .await;

    let mut rx = app.state.rooms.subscribe(Room::Project(project_id));
    let request_id = Uuid::new_v4();
    let (status, _) = app
        .put(
            &format!("{}/cards/{}/move", fixture.board_uri(), id_of(&card)),
            &owner.token,
            json!({
                "sourceColumnId": fixture.columns[0],
                "targetColumnId": fixture.columns[1],
                "requestId": request_id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let event = next_event(&mut rx).await;
    assert_eq!(event.name(), "card:moved");
    assert_eq!(event.project_id, Some(project_id));
    assert_eq!(event.actor_id, Some(owner.id));
    match event.payload {
        EventPayload::CardMoved {
            request_id: echoed,
            order,
            target_column_id,
            ..
        } => {
            assert_eq!(echoed, Some(request_id));
            assert_eq!(order, 0);
            assert_eq!(target_column_id.to_string(), fixture.columns[1]);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn test_events_stay_in_their_project() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let first = create_board_fixture(&app, &owner).await;
    let second = create_board_fixture(&app, &owner).await;

    let mut rx = app
        .state
        .rooms
        .subscribe(Room::Project(second.project_id.parse().unwrap()));

    let (status, _) = app
        .post(&first.cards_uri(0), &owner.token, json!({ "title": "Elsewhere" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_notification_reaches_user_room() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let editor = signup_user(&app, "Editor").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &editor, "editor").await;

    let mut rx = app.state.rooms.subscribe(Room::User(editor.id));
    let (status, _) = app
        .post(
            &fixture.cards_uri(0),
            &owner.token,
            json!({ "title": "Yours", "assignees": [editor.id] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let event = next_event(&mut rx).await;
    assert_eq!(event.name(), "notification");
    match event.payload {
        EventPayload::Notification { notification } => {
            assert_eq!(notification.user_id, editor.id);
            assert!(!notification.read);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn test_sse_subscription_requires_view_permission() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let stranger = signup_user(&app, "Stranger").await;
    let fixture = create_board_fixture(&app, &owner).await;
    let events_uri = format!("{}/events", fixture.project_uri());

    let response = app.send(Method::GET, &events_uri, Some(&stranger.token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(Method::GET, &events_uri, Some(&owner.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
}

#[tokio::test]
async fn test_websocket_requires_token() {
    let app = TestApp::new();

    let response = app.json(Method::GET, "/ws", None, None).await;
    crate::assert_error_response!(response, StatusCode::UNAUTHORIZED, "Authentication error");

    let (status, _) = app.json(Method::GET, "/ws?token=garbage", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_websocket_with_token_but_no_upgrade() {
    let app = TestApp::new();
    let user = signup_user(&app, "Ada").await;

    // A plain GET cannot be upgraded; the token itself was accepted
    let (status, _) = app.get("/ws", &user.token).await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_sse_ends_for_removed_member() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let editor = signup_user(&app, "Editor").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &editor, "editor").await;

    let events_uri = format!("{}/events", fixture.project_uri());
    let response = app.send(Method::GET, &events_uri, Some(&editor.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = app
        .delete(&format!("{}/members/{}", fixture.project_uri(), editor.id), &owner.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(
            &format!("{}/boards", fixture.project_uri()),
            &owner.token,
            json!({ "name": "Secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let body = drain_stream(response).await;
    assert!(body.contains("member:removed"), "body: {body}");
    assert!(!body.contains("board:created"), "body: {body}");
    assert!(!body.contains("Secret"), "body: {body}");
}

#[tokio::test]
async fn test_sse_ends_when_project_deleted() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let events_uri = format!("{}/events", fixture.project_uri());
    let response = app.send(Method::GET, &events_uri, Some(&owner.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = app.delete(&fixture.project_uri(), &owner.token).await;
    assert_eq!(status, StatusCode::OK);

    let body = drain_stream(response).await;
    assert!(body.contains("project:deleted"), "body: {body}");
}
