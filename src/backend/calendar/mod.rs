//! Calendar Integration
//!
//! Pushes dated cards to Google Calendar.
//!
//! - **`client`** - reqwest client for the Calendar v3 API
//! - **`sync`** - `POST /projects/{project_id}/calendar/sync`

/// Google Calendar API client
pub mod client;

/// Project sync handler
pub mod sync;

pub use client::{CalendarError, CalendarEvent, GoogleCalendarClient};
pub use sync::{sync_calendar, SyncReport};
