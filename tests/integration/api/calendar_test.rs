//! Calendar sync integration tests
//!
//! The Google Calendar API is replaced by a wiremock server through
//! `calendar.api_base`.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskflow::backend::server::config::ServerConfig;

use crate::common::{create_board_fixture, id_of, signup_user, BoardFixture, TestApp, TestUser};

const DUE: &str = "2025-03-01T14:00:00Z";

fn calendar_app(server: &MockServer) -> TestApp {
    let mut config = ServerConfig::default();
    config.calendar.api_base = server.uri();
    TestApp::with_config(config)
}

async fn link_google(app: &TestApp, user: &TestUser) {
    let (status, body) = app
        .put(
            "/auth/providers/google",
            &user.token,
            json!({ "providerId": "g-1", "accessToken": "access-1", "refreshToken": "refresh-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "link failed: {body}");
}

async fn dated_card(app: &TestApp, user: &TestUser, fixture: &BoardFixture, title: &str) -> String {
    let (status, card) = app
        .post(&fixture.cards_uri(0), &user.token, json!({ "title": title, "dueDate": DUE }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create card failed: {card}");
    id_of(&card)
}

async fn mount_event(server: &MockServer, title: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_partial_json(json!({ "summary": format!("[Task] {title}") })))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

async fn sync(app: &TestApp, user: &TestUser, fixture: &BoardFixture) -> Value {
    let (status, report) = app
        .post(&format!("{}/calendar/sync", fixture.project_uri()), &user.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "sync failed: {report}");
    report
}

/// `calendarEventId` of every card in the first board, by title
async fn event_ids(app: &TestApp, user: &TestUser, fixture: &BoardFixture) -> Vec<(String, Value)> {
    let (_, project) = app.get(&fixture.project_uri(), &user.token).await;
    project["boards"][0]["columns"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|column| column["cards"].as_array().cloned().unwrap_or_default())
        .map(|card| {
            let title = card["title"].as_str().unwrap_or_default().to_string();
            (title, card["calendarEventId"].clone())
        })
        .collect()
}

#[tokio::test]
async fn test_sync_saves_ids_and_reports_failures() {
    let server = MockServer::start().await;
    let ok = |id: &str| ResponseTemplate::new(200).set_body_json(json!({ "id": id }));
    mount_event(&server, "Kickoff", ok("evt-kickoff"), 1).await;
    mount_event(&server, "Review", ok("evt-review"), 1).await;
    mount_event(&server, "Broken", ResponseTemplate::new(500).set_body_string("backend down"), 2).await;

    let app = calendar_app(&server);
    let owner = signup_user(&app, "Owner").await;
    link_google(&app, &owner).await;
    let fixture = create_board_fixture(&app, &owner).await;
    dated_card(&app, &owner, &fixture, "Kickoff").await;
    dated_card(&app, &owner, &fixture, "Review").await;
    let broken = dated_card(&app, &owner, &fixture, "Broken").await;
    let (status, _) = app
        .post(&fixture.cards_uri(0), &owner.token, json!({ "title": "Undated" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let report = sync(&app, &owner, &fixture).await;
    assert_eq!(report["eventsCreated"], 2);
    assert_eq!(report["totalCards"], 3);
    assert_eq!(report["message"], "Successfully synced 2 cards to Google Calendar");
    let errors = report["errors"].as_array().cloned().unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["cardId"], json!(broken));
    assert_eq!(errors[0]["cardTitle"], "Broken");
    crate::assert_contains!(errors[0]["error"].as_str().unwrap_or_default(), "500");

    assert_eq!(
        event_ids(&app, &owner, &fixture).await,
        vec![
            ("Kickoff".to_string(), json!("evt-kickoff")),
            ("Review".to_string(), json!("evt-review")),
            ("Broken".to_string(), Value::Null),
            ("Undated".to_string(), Value::Null),
        ]
    );

    let (_, page) = app.get("/notifications", &owner.token).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["type"], "calendar_event");
    assert_eq!(page["items"][0]["payload"]["eventsCreated"], 2);
    assert_eq!(page["items"][0]["payload"]["projectName"], "Launch");

    // Synced cards are skipped; only the failed one is retried
    let report = sync(&app, &owner, &fixture).await;
    assert_eq!(report["eventsCreated"], 0);
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(1));

    let (_, page) = app.get("/notifications", &owner.token).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_card_moved_during_sync_keeps_event_id() {
    let server = MockServer::start().await;
    let slow = ResponseTemplate::new(200)
        .set_body_json(json!({ "id": "evt-moving" }))
        .set_delay(Duration::from_millis(300));
    mount_event(&server, "Moving", slow, 1).await;

    let app = calendar_app(&server);
    let owner = signup_user(&app, "Owner").await;
    link_google(&app, &owner).await;
    let fixture = create_board_fixture(&app, &owner).await;
    let card_id = dated_card(&app, &owner, &fixture, "Moving").await;

    let move_card = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.put(
            &format!("{}/cards/{}/move", fixture.board_uri(), card_id),
            &owner.token,
            json!({
                "sourceColumnId": fixture.columns[0],
                "targetColumnId": fixture.columns[2]
            }),
        )
        .await
    };
    let (report, (move_status, _)) = tokio::join!(sync(&app, &owner, &fixture), move_card);
    assert_eq!(move_status, StatusCode::OK);
    assert_eq!(report["eventsCreated"], 1);
    assert!(report.get("errors").is_none(), "report: {report}");

    let (_, project) = app.get(&fixture.project_uri(), &owner.token).await;
    let done = &project["boards"][0]["columns"][2]["cards"][0];
    assert_eq!(done["id"], json!(card_id));
    assert_eq!(done["calendarEventId"], "evt-moving");

    // The saved id stops a second sync from creating a duplicate event
    let report = sync(&app, &owner, &fixture).await;
    assert_eq!(report["eventsCreated"], 0);
}
