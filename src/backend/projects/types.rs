/**
 * Project Handler Types
 *
 * Request and response bodies of the project, member, board, column and
 * card endpoints. Request fields are optional so that a missing field is
 * reported with a specific message instead of a generic decode failure.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::{Attachment, Card, CardStatus, Priority, ProjectSettings, Visibility};

/// Distinguish an explicit `null` from an absent field
///
/// Used with `#[serde(default)]` on `Option<Option<T>>`: absent stays
/// `None`, `null` becomes `Some(None)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trimmed, non-empty value of a required text field
pub fn required_text(value: Option<&str>, message: &str) -> Result<String, BackendError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BackendError::bad_request(message))
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub settings: Option<ProjectSettings>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub email: Option<String>,
    /// Defaults to `viewer`
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOwnershipRequest {
    pub new_owner_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub name: Option<String>,
    pub order: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumnRequest {
    pub name: Option<String>,
    /// New position of the column on its board
    pub order: Option<i64>,
    /// `0` removes the limit
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub order: Option<i64>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub assignees: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `null` clears the due date
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub status: Option<CardStatus>,
    pub tags: Option<Vec<String>>,
    pub assignees: Option<Vec<Uuid>>,
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub source_column_id: Option<Uuid>,
    pub target_column_id: Option<Uuid>,
    pub new_order: Option<i64>,
    /// Client-chosen id echoed in the `card:moved` event
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardResponse {
    pub message: String,
    pub card: Card,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub body: Option<String>,
}

/// Plain `{message}` acknowledgement
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
