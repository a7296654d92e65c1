//! WebSocket session tests
//!
//! Drives `/ws` over a real socket: joining a project room, receiving the
//! events of HTTP mutations, and losing the room when access goes away.

use axum::http::StatusCode;
use axum_test::{TestServer, TestWebSocket};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;

use crate::common::{add_member, create_board_fixture, id_of, signup_user, TestApp};

fn socket_server(app: &TestApp) -> TestServer {
    TestServer::builder()
        .http_transport()
        .build(app.router.clone())
        .unwrap()
}

async fn connect(server: &TestServer, token: &str) -> TestWebSocket {
    server
        .get_websocket("/ws")
        .add_query_param("token", token)
        .await
        .into_websocket()
        .await
}

async fn next_frame(socket: &mut TestWebSocket) -> Value {
    tokio::time::timeout(Duration::from_secs(2), socket.receive_json::<Value>())
        .await
        .expect("frame within timeout")
}

/// Frames up to and including the first one of `kind`
async fn frames_until(socket: &mut TestWebSocket, kind: &str) -> Vec<Value> {
    let mut frames = Vec::new();
    loop {
        let frame = next_frame(socket).await;
        let done = frame["type"] == kind;
        frames.push(frame);
        if done {
            return frames;
        }
    }
}

fn event_names(frames: &[Value]) -> Vec<String> {
    frames
        .iter()
        .filter(|f| f["type"] == "event")
        .filter_map(|f| f["event"]["payload"]["event"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_joined_member_receives_card_moves() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let fixture = create_board_fixture(&app, &owner).await;
    let (_, card) = app
        .post(&fixture.cards_uri(0), &owner.token, json!({ "title": "Live" }))
        .await;

    let server = socket_server(&app);
    let mut socket = connect(&server, &owner.token).await;
    socket
        .send_json(&json!({ "type": "join:project", "projectId": fixture.project_id }))
        .await;
    assert_eq!(
        next_frame(&mut socket).await,
        json!({ "type": "joined", "projectId": fixture.project_id })
    );

    let (status, _) = app
        .put(
            &format!("{}/cards/{}/move", fixture.board_uri(), id_of(&card)),
            &owner.token,
            json!({
                "sourceColumnId": fixture.columns[0],
                "targetColumnId": fixture.columns[2]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let frames = frames_until(&mut socket, "event").await;
    let moved = frames.last().unwrap();
    assert_eq!(moved["event"]["payload"]["event"], "card:moved");
    assert_eq!(moved["event"]["projectId"], json!(fixture.project_id));
    assert_eq!(moved["event"]["payload"]["data"]["cardId"], card["id"]);

    socket
        .send_json(&json!({ "type": "leave:project", "projectId": fixture.project_id }))
        .await;
    let frames = frames_until(&mut socket, "left").await;
    assert_eq!(frames.last().unwrap()["projectId"], json!(fixture.project_id));
}

#[tokio::test]
async fn test_non_member_join_is_refused() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let stranger = signup_user(&app, "Stranger").await;
    let fixture = create_board_fixture(&app, &owner).await;

    let server = socket_server(&app);
    let mut socket = connect(&server, &stranger.token).await;
    socket
        .send_json(&json!({ "type": "join:project", "projectId": fixture.project_id }))
        .await;
    assert_eq!(
        next_frame(&mut socket).await,
        json!({ "type": "error", "message": "Not a project member" })
    );

    let (status, _) = app
        .post(&fixture.cards_uri(0), &owner.token, json!({ "title": "Private" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    socket.send_json(&json!({ "type": "ping" })).await;
    assert_eq!(next_frame(&mut socket).await, json!({ "type": "pong" }));
}

#[tokio::test]
async fn test_bad_token_never_upgrades() {
    let app = TestApp::new();
    let server = socket_server(&app);

    let response = server
        .get_websocket("/ws")
        .add_query_param("token", "garbage")
        .expect_failure()
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["status"], 401);
}

#[tokio::test]
async fn test_removed_member_leaves_project_room() {
    let app = TestApp::new();
    let owner = signup_user(&app, "Owner").await;
    let editor = signup_user(&app, "Editor").await;
    let fixture = create_board_fixture(&app, &owner).await;
    add_member(&app, &owner, &fixture, &editor, "editor").await;

    let server = socket_server(&app);
    let mut socket = connect(&server, &editor.token).await;
    socket
        .send_json(&json!({ "type": "join:project", "projectId": fixture.project_id }))
        .await;
    assert_eq!(next_frame(&mut socket).await["type"], "joined");

    let (status, _) = app
        .delete(&format!("{}/members/{}", fixture.project_uri(), editor.id), &owner.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let frames = frames_until(&mut socket, "left").await;
    assert_eq!(event_names(&frames), vec!["member:removed"]);
    assert_eq!(frames.last().unwrap()["projectId"], json!(fixture.project_id));

    let (status, _) = app
        .post(
            &format!("{}/boards", fixture.project_uri()),
            &owner.token,
            json!({ "name": "Secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    socket.send_json(&json!({ "type": "ping" })).await;
    let frames = frames_until(&mut socket, "pong").await;
    assert!(event_names(&frames).is_empty(), "leaked: {frames:?}");
}
