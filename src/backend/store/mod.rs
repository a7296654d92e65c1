//! Kanban Store
//!
//! The authoritative working set of users, projects and notifications.
//!
//! # Architecture
//!
//! All data lives in memory behind a single `tokio::sync::RwLock`. When a
//! database pool is configured, every mutation writes the touched document
//! through to PostgreSQL while the write lock is still held, so documents
//! reach the database in the same order they were changed. On startup
//! [`KanbanStore::restore`] loads the persisted documents back.
//!
//! Project mutations run on a draft copy: a closure that fails leaves the
//! stored project untouched.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs - KanbanStore
//! └── db.rs  - JSONB persistence
//! ```

/// Database persistence
pub mod db;

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::auth::users::{normalize_email, User};
use crate::shared::{Notification, NotificationPage, Project, SharedError, UserProfile};

/// Notifications kept per user; older ones are dropped as new ones arrive
pub const NOTIFICATION_RETENTION: usize = 500;

#[derive(Default)]
struct StoreData {
    users: HashMap<Uuid, User>,
    emails: HashMap<String, Uuid>,
    projects: HashMap<Uuid, Project>,
    /// Per user, oldest first
    notifications: HashMap<Uuid, Vec<Notification>>,
}

/// Counts of documents loaded by [`KanbanStore::restore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    pub users: usize,
    pub projects: usize,
    pub notifications: usize,
}

/// Shared handle to the working set, cheap to clone
#[derive(Clone)]
pub struct KanbanStore {
    data: Arc<RwLock<StoreData>>,
    db: Option<PgPool>,
}

impl KanbanStore {
    pub fn new(db: Option<PgPool>) -> Self {
        Self {
            data: Arc::new(RwLock::new(StoreData::default())),
            db,
        }
    }

    /// Store without persistence
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn db_pool(&self) -> Option<&PgPool> {
        self.db.as_ref()
    }

    /// Replace the working set with the persisted documents
    ///
    /// Does nothing without a database.
    pub async fn restore(&self) -> Result<RestoreStats, sqlx::Error> {
        let Some(pool) = &self.db else {
            return Ok(RestoreStats::default());
        };

        let users = db::load_users(pool).await?;
        let projects = db::load_projects(pool).await?;
        let notifications = db::load_notifications(pool).await?;
        let stats = RestoreStats {
            users: users.len(),
            projects: projects.len(),
            notifications: notifications.len(),
        };

        let mut loaded = StoreData::default();
        for user in users {
            loaded.emails.insert(user.email.clone(), user.id);
            loaded.users.insert(user.id, user);
        }
        for project in projects {
            loaded.projects.insert(project.id, project);
        }
        for notification in notifications {
            loaded
                .notifications
                .entry(notification.user_id)
                .or_default()
                .push(notification);
        }
        for list in loaded.notifications.values_mut() {
            trim_oldest(list);
        }

        *self.data.write().await = loaded;
        Ok(stats)
    }

    // ----- users -----

    /// Insert a new user, rejecting duplicate emails
    pub async fn create_user(&self, user: User) -> Result<User, SharedError> {
        let mut data = self.data.write().await;
        if data.emails.contains_key(&user.email) {
            return Err(SharedError::conflict("Email already registered"));
        }
        data.emails.insert(user.email.clone(), user.id);
        data.users.insert(user.id, user.clone());
        self.persist_user(&user).await;
        Ok(user)
    }

    pub async fn user(&self, user_id: Uuid) -> Option<User> {
        self.data.read().await.users.get(&user_id).cloned()
    }

    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let data = self.data.read().await;
        data.emails
            .get(&normalize_email(email))
            .and_then(|id| data.users.get(id))
            .cloned()
    }

    /// Mutate a user in place. Returns `None` if the user does not exist.
    pub async fn update_user<T>(&self, user_id: Uuid, f: impl FnOnce(&mut User) -> T) -> Option<T> {
        let mut data = self.data.write().await;
        let user = data.users.get_mut(&user_id)?;
        let out = f(user);
        let snapshot = user.clone();
        self.persist_user(&snapshot).await;
        Some(out)
    }

    /// Public profiles for the given ids; unknown ids are skipped
    pub async fn profiles(&self, ids: impl IntoIterator<Item = Uuid>) -> HashMap<Uuid, UserProfile> {
        let data = self.data.read().await;
        ids.into_iter()
            .filter_map(|id| data.users.get(&id).map(|u| (id, u.profile())))
            .collect()
    }

    // ----- projects -----

    pub async fn insert_project(&self, project: Project) -> Project {
        let mut data = self.data.write().await;
        data.projects.insert(project.id, project.clone());
        self.persist_project(&project).await;
        project
    }

    pub async fn project(&self, project_id: Uuid) -> Option<Project> {
        self.data.read().await.projects.get(&project_id).cloned()
    }

    /// Inspect a project under the read lock without cloning it
    pub async fn with_project<T>(&self, project_id: Uuid, f: impl FnOnce(&Project) -> T) -> Option<T> {
        self.data.read().await.projects.get(&project_id).map(f)
    }

    /// Projects `user_id` is a member of, most recently updated first
    pub async fn projects_for(&self, user_id: Uuid) -> Vec<Project> {
        let data = self.data.read().await;
        let mut projects: Vec<Project> = data
            .projects
            .values()
            .filter(|p| p.member(user_id).is_some())
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects
    }

    /// Run `f` against a draft of the project and commit it on success.
    ///
    /// A missing project yields `"Project not found"`. Errors from `f`
    /// discard the draft.
    pub async fn update_project<T, E>(
        &self,
        project_id: Uuid,
        f: impl FnOnce(&mut Project) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<SharedError>,
    {
        let mut data = self.data.write().await;
        let mut draft = data
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| SharedError::not_found("Project not found"))?;

        let out = f(&mut draft)?;
        draft.touch();
        self.persist_project(&draft).await;
        data.projects.insert(project_id, draft);
        Ok(out)
    }

    /// Remove a project after `check` approves it
    pub async fn delete_project<E>(
        &self,
        project_id: Uuid,
        check: impl FnOnce(&Project) -> Result<(), E>,
    ) -> Result<Project, E>
    where
        E: From<SharedError>,
    {
        let mut data = self.data.write().await;
        let project = data
            .projects
            .get(&project_id)
            .ok_or_else(|| SharedError::not_found("Project not found"))?;
        check(project)?;

        let removed = data
            .projects
            .remove(&project_id)
            .ok_or_else(|| SharedError::not_found("Project not found"))?;
        if let Some(pool) = &self.db {
            if let Err(e) = db::delete_project(pool, project_id).await {
                tracing::error!("Failed to delete project {} from database: {:?}", project_id, e);
            }
        }
        Ok(removed)
    }

    // ----- notifications -----

    pub async fn push_notification(&self, notification: Notification) {
        let mut data = self.data.write().await;
        self.persist_notification(&notification).await;
        let user_id = notification.user_id;
        let list = data.notifications.entry(user_id).or_default();
        list.push(notification);

        if trim_oldest(list) > 0 {
            if let Some(pool) = &self.db {
                let keep = i64::try_from(NOTIFICATION_RETENTION).unwrap_or(i64::MAX);
                if let Err(e) = db::prune_notifications(pool, user_id, keep).await {
                    tracing::error!("Failed to prune notifications for {}: {:?}", user_id, e);
                }
            }
        }
    }

    /// A page of notifications, newest first
    pub async fn notifications(&self, user_id: Uuid, limit: usize, offset: usize) -> NotificationPage {
        let data = self.data.read().await;
        let all = data
            .notifications
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        NotificationPage {
            items: all.iter().rev().skip(offset).take(limit).cloned().collect(),
            total: all.len(),
            unread_count: all.iter().filter(|n| !n.read).count(),
        }
    }

    /// Mark one notification read; `None` unless it belongs to `user_id`
    pub async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> Option<Notification> {
        let mut data = self.data.write().await;
        let notification = data
            .notifications
            .get_mut(&user_id)?
            .iter_mut()
            .find(|n| n.id == notification_id)?;
        notification.read = true;
        let snapshot = notification.clone();
        self.persist_notification(&snapshot).await;
        Some(snapshot)
    }

    /// Returns how many notifications changed
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> usize {
        let mut data = self.data.write().await;
        let Some(list) = data.notifications.get_mut(&user_id) else {
            return 0;
        };
        let mut changed = 0;
        for notification in list.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            if let Some(pool) = &self.db {
                if let Err(e) = db::mark_all_notifications_read(pool, user_id).await {
                    tracing::error!("Failed to persist read notifications for {}: {:?}", user_id, e);
                }
            }
        }
        changed
    }

    // ----- write-through -----

    async fn persist_user(&self, user: &User) {
        if let Some(pool) = &self.db {
            if let Err(e) = db::save_user(pool, user).await {
                tracing::error!("Failed to persist user {}: {:?}", user.id, e);
            }
        }
    }

    async fn persist_project(&self, project: &Project) {
        if let Some(pool) = &self.db {
            if let Err(e) = db::save_project(pool, project).await {
                tracing::error!("Failed to persist project {}: {:?}", project.id, e);
            }
        }
    }

    async fn persist_notification(&self, notification: &Notification) {
        if let Some(pool) = &self.db {
            if let Err(e) = db::save_notification(pool, notification).await {
                tracing::error!("Failed to persist notification {}: {:?}", notification.id, e);
            }
        }
    }
}

/// Drop the oldest entries past the retention cap, returning how many went
fn trim_oldest(list: &mut Vec<Notification>) -> usize {
    let excess = list.len().saturating_sub(NOTIFICATION_RETENTION);
    list.drain(..excess);
    excess
}
