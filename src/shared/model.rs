//! Kanban Data Model
//!
//! Plain nested records exchanged between the server and its clients.
//! A `Project` embeds its `Board`s, a board embeds its ordered `Column`s and
//! each column embeds its ordered `Card`s. Every record serializes to the
//! camelCase JSON used on the wire.
//!
//! # Ordering
//!
//! Columns and cards carry an `order` field that always equals their index
//! in the parent vector. The functions in [`crate::shared::ordering`] keep
//! that true after inserts, moves and removals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::permissions::Role;

/// Who may see a project
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Team,
    Public,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Active,
    Archived,
}

/// File attached to a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a card's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub actor_id: Uuid,
    pub action: String,
    #[serde(default)]
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Leaf work item of the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: u32,
    #[serde(default)]
    pub assignees: Vec<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub activity_log: Vec<ActivityEntry>,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            order: 0,
            assignees: Vec::new(),
            tags: Vec::new(),
            priority: Priority::default(),
            due_date: None,
            status: CardStatus::default(),
            attachments: Vec::new(),
            comments: Vec::new(),
            activity_log: Vec::new(),
            calendar_event_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an activity entry and bump `updated_at`
    pub fn record(&mut self, actor_id: Uuid, action: &str, meta: serde_json::Value) {
        let now = Utc::now();
        self.activity_log.push(ActivityEntry {
            actor_id,
            action: action.to_string(),
            meta,
            created_at: now,
        });
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: Uuid,
    pub name: String,
    pub order: u32,
    /// Work-in-progress limit, `None` means unlimited
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            order: 0,
            limit: None,
            cards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn card(&self, card_id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: Uuid) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    /// True when another card would exceed the WIP limit
    pub fn is_full(&self) -> bool {
        matches!(self.limit, Some(limit) if self.cards.len() >= limit as usize)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            columns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn column(&self, column_id: Uuid) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: Uuid) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// Locate a card anywhere on the board, returning its column id too
    pub fn find_card(&self, card_id: Uuid) -> Option<(Uuid, &Card)> {
        self.columns
            .iter()
            .find_map(|col| col.card(card_id).map(|card| (col.id, card)))
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.iter().flat_map(|col| col.cards.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default)]
    pub enable_calendar_sync: bool,
    #[serde(default)]
    pub default_assignee: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    #[serde(default)]
    pub settings: ProjectSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// New project with `owner_id` as its only member
    pub fn new(name: impl Into<String>, description: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            visibility: Visibility::default(),
            boards: Vec::new(),
            members: vec![ProjectMember {
                user_id: owner_id,
                role: Role::Owner,
                joined_at: now,
            }],
            settings: ProjectSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(&self, user_id: Uuid) -> Option<&ProjectMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn member_mut(&mut self, user_id: Uuid) -> Option<&mut ProjectMember> {
        self.members.iter_mut().find(|m| m.user_id == user_id)
    }

    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        self.member(user_id).map(|m| m.role)
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        self.members
            .iter()
            .find(|m| m.role == Role::Owner)
            .map(|m| m.user_id)
    }

    pub fn board(&self, board_id: Uuid) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    pub fn board_mut(&mut self, board_id: Uuid) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == board_id)
    }

    /// Wherever the card currently sits: `(board_id, column_id, card)`
    pub fn locate_card_mut(&mut self, card_id: Uuid) -> Option<(Uuid, Uuid, &mut Card)> {
        self.boards.iter_mut().find_map(|board| {
            let board_id = board.id;
            board.columns.iter_mut().find_map(|column| {
                let column_id = column.id;
                column.card_mut(card_id).map(|card| (board_id, column_id, card))
            })
        })
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Public view of a user, safe to hand to any project member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Project member joined with the member's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    /// `None` when the user record no longer exists
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskMoved,
    Comment,
    CalendarEvent,
    Mention,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, kind: NotificationKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            payload,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// One page of a user's notifications, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub total: usize,
    pub unread_count: usize,
}
