/**
 * REST API Client
 *
 * Async wrapper over the server's REST endpoints. Holds the session token
 * after `login` and sends it as a bearer header on every protected call.
 *
 * # Error Handling
 *
 * Non-2xx replies become `ClientError::Api` carrying the status and the
 * server's `error` message (or the raw body when it is not JSON).
 */

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::shared::model::{Board, Card, Column, Notification, NotificationPage, Project, UserProfile};
use crate::shared::ordering::CardMove;

/// Token and profile returned by login
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveBody {
    source_column_id: Uuid,
    target_column_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_order: Option<i64>,
    request_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct MoveReply {
    card: Card,
}

/// HTTP client for one server
pub struct ApiClient {
    config: ClientConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.token.is_some()
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.config.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(body);
            tracing::warn!("API request failed: {} - {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.authed(self.http.get(self.config.api_url(path)))?;
        Self::parse(request.send().await?).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ClientError> {
        let request = self.authed(self.http.request(method, self.config.api_url(path)))?;
        Self::parse(request.json(body).send().await?).await
    }

    /// Log in and keep the returned token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let response = self
            .http
            .post(self.config.api_url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: AuthSession = Self::parse(response).await?;
        self.config.set_token(Some(session.token.clone()));
        tracing::info!("Logged in as {}", session.user.email);
        Ok(session)
    }

    pub fn logout(&mut self) {
        self.config.clear_token();
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get("/projects").await
    }

    pub async fn project(&self, project_id: Uuid) -> Result<Project, ClientError> {
        self.get(&format!("/projects/{project_id}")).await
    }

    pub async fn create_project(&self, name: &str, description: &str) -> Result<Project, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            "/projects",
            &json!({ "name": name, "description": description }),
        )
        .await
    }

    pub async fn create_board(&self, project_id: Uuid, name: &str) -> Result<Board, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/projects/{project_id}/boards"),
            &json!({ "name": name }),
        )
        .await
    }

    pub async fn create_column(
        &self,
        project_id: Uuid,
        board_id: Uuid,
        name: &str,
        limit: Option<u32>,
    ) -> Result<Column, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/projects/{project_id}/boards/{board_id}/columns"),
            &json!({ "name": name, "limit": limit }),
        )
        .await
    }

    pub async fn create_card(
        &self,
        project_id: Uuid,
        board_id: Uuid,
        column_id: Uuid,
        title: &str,
    ) -> Result<Card, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/projects/{project_id}/boards/{board_id}/columns/{column_id}/cards"),
            &json!({ "title": title }),
        )
        .await
    }

    /// Send a move; `request_id` is echoed back in the `card:moved` event
    pub async fn move_card(
        &self,
        project_id: Uuid,
        board_id: Uuid,
        movement: &CardMove,
        request_id: Uuid,
    ) -> Result<Card, ClientError> {
        let body = serde_json::to_value(MoveBody {
            source_column_id: movement.source_column_id,
            target_column_id: movement.target_column_id,
            new_order: movement.new_order,
            request_id,
        })
        .map_err(|e| crate::shared::SharedError::serialization(e.to_string()))?;

        let reply: MoveReply = self
            .send_json(
                reqwest::Method::PUT,
                &format!(
                    "/projects/{project_id}/boards/{board_id}/cards/{}/move",
                    movement.card_id
                ),
                &body,
            )
            .await?;
        Ok(reply.card)
    }

    pub async fn notifications(&self, limit: usize, offset: usize) -> Result<NotificationPage, ClientError> {
        self.get(&format!("/notifications?limit={limit}&offset={offset}")).await
    }

    pub async fn mark_read(&self, notification_id: Uuid) -> Result<Notification, ClientError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/notifications/{notification_id}/read"),
            &json!({}),
        )
        .await
    }
}
