/**
 * Google Calendar Client
 *
 * Thin reqwest wrapper around the Calendar v3 `events.insert` call. The
 * caller supplies the user's OAuth access token; obtaining and refreshing
 * that token happens elsewhere.
 */

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::server::config::CalendarConfig;

/// Calendar API failures
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Calendar request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Calendar API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Calendar API response carried no event id")]
    MissingEventId,
}

/// Start or end of an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Request body of `events.insert`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

impl CalendarEvent {
    /// Event for a card due at `due`, lasting the configured duration
    pub fn for_card(title: &str, description: &str, due: DateTime<Utc>, config: &CalendarConfig) -> Self {
        let end = due + Duration::minutes(config.event_duration_minutes);
        let description = if description.trim().is_empty() {
            "No description".to_string()
        } else {
            description.to_string()
        };
        Self {
            summary: format!("[Task] {}", title),
            description,
            start: EventTime {
                date_time: due.to_rfc3339(),
                time_zone: config.time_zone.clone(),
            },
            end: EventTime {
                date_time: end.to_rfc3339(),
                time_zone: config.time_zone.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: Option<String>,
}

/// Outbound Google Calendar client, cheap to clone
#[derive(Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    api_base: String,
    calendar_id: String,
}

impl GoogleCalendarClient {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
        }
    }

    /// Create an event and return its id
    ///
    /// # Errors
    ///
    /// * `CalendarError::Request` - Network failure or undecodable body
    /// * `CalendarError::Api` - Non-success status from the API
    /// * `CalendarError::MissingEventId` - Success without an id
    pub async fn create_event(&self, access_token: &str, event: &CalendarEvent) -> Result<String, CalendarError> {
        let url = format!("{}/calendars/{}/events", self.api_base, self.calendar_id);
        tracing::debug!("[Calendar] Creating event '{}'", event.summary);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            tracing::warn!("[Calendar] Event insert failed with {}", status);
            return Err(CalendarError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let inserted: InsertedEvent = response.json().await?;
        inserted
            .id
            .filter(|id| !id.is_empty())
            .ok_or(CalendarError::MissingEventId)
    }
}
