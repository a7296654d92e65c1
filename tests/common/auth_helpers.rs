//! Authentication test helpers
//!
//! Provides utilities for creating test users through the public API and
//! for building a project skeleton to test against.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use super::app::TestApp;

/// Test user credentials
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// Sign a user up through `POST /auth/signup`
pub async fn signup_user(app: &TestApp, name: &str) -> TestUser {
    let email = format!("{}_{}@example.com", name.to_lowercase(), Uuid::new_v4().simple());
    let password = "test_password_123".to_string();

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "email": email, "name": name, "password": password })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

    TestUser {
        id: body["user"]["id"].as_str().and_then(|id| id.parse().ok()).expect("user id"),
        email,
        password,
        token: body["token"].as_str().expect("token").to_string(),
    }
}

/// Project with one board and the columns `Todo`, `Doing`, `Done`
pub struct BoardFixture {
    pub project_id: String,
    pub board_id: String,
    pub columns: Vec<String>,
}

impl BoardFixture {
    pub fn project_uri(&self) -> String {
        format!("/projects/{}", self.project_id)
    }

    pub fn board_uri(&self) -> String {
        format!("/projects/{}/boards/{}", self.project_id, self.board_id)
    }

    pub fn cards_uri(&self, column: usize) -> String {
        format!("{}/columns/{}/cards", self.board_uri(), self.columns[column])
    }
}

pub async fn create_board_fixture(app: &TestApp, owner: &TestUser) -> BoardFixture {
    let (status, project) = app
        .post("/projects", &owner.token, json!({ "name": "Launch" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {project}");
    let project_id = id_of(&project);

    let (status, board) = app
        .post(
            &format!("/projects/{project_id}/boards"),
            &owner.token,
            json!({ "name": "Sprint 1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create board failed: {board}");
    let board_id = id_of(&board);

    let mut columns = Vec::new();
    for name in ["Todo", "Doing", "Done"] {
        let (status, column) = app
            .post(
                &format!("/projects/{project_id}/boards/{board_id}/columns"),
                &owner.token,
                json!({ "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create column failed: {column}");
        columns.push(id_of(&column));
    }

    BoardFixture {
        project_id,
        board_id,
        columns,
    }
}

/// Add `user` to the fixture's project with `role`
pub async fn add_member(app: &TestApp, owner: &TestUser, fixture: &BoardFixture, user: &TestUser, role: &str) {
    let (status, body) = app
        .post(
            &format!("{}/members", fixture.project_uri()),
            &owner.token,
            json!({ "email": user.email, "role": role }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "add member failed: {body}");
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_string()
}
