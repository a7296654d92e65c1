/**
 * Database Operations for Users, Projects and Notifications
 *
 * Each record is persisted as a JSONB document next to the few columns
 * needed for indexing. The in-memory store is the working copy; these
 * functions write it through and load it back on startup.
 */

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::{Notification, Project};

/// Insert or replace a user document
pub async fn save_user(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, document, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            document = EXCLUDED.document,
            updated_at = EXCLUDED.updated_at
        "#
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(Json(user))
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all users
pub async fn load_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Json<User>,)>(
        r#"
        SELECT document
        FROM users
        ORDER BY created_at ASC
        "#
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(Json(user),)| user).collect())
}

/// Insert or replace a project document
pub async fn save_project(pool: &PgPool, project: &Project) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO projects (id, document, created_at, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE SET
            document = EXCLUDED.document,
            updated_at = EXCLUDED.updated_at
        "#
    )
    .bind(project.id)
    .bind(Json(project))
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_project(pool: &PgPool, project_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all projects
pub async fn load_projects(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Json<Project>,)>(
        r#"
        SELECT document
        FROM projects
        ORDER BY created_at ASC
        "#
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(Json(project),)| project).collect())
}

/// Insert or replace a notification
pub async fn save_notification(
    pool: &PgPool,
    notification: &Notification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, document, read, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            document = EXCLUDED.document,
            read = EXCLUDED.read
        "#
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(Json(notification))
    .bind(notification.read)
    .bind(notification.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark every notification of a user as read
pub async fn mark_all_notifications_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET read = TRUE,
            document = jsonb_set(document, '{read}', 'true'::jsonb)
        WHERE user_id = $1 AND read = FALSE
        "#
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Load all notifications, oldest first
pub async fn load_notifications(pool: &PgPool) -> Result<Vec<Notification>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Json<Notification>,)>(
        r#"
        SELECT document
        FROM notifications
        ORDER BY created_at ASC
        "#
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(Json(n),)| n).collect())
}

/// Delete a user's notifications beyond the newest `keep`
pub async fn prune_notifications(pool: &PgPool, user_id: Uuid, keep: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE user_id = $1
          AND id NOT IN (
              SELECT id FROM notifications
              WHERE user_id = $1
              ORDER BY created_at DESC
              LIMIT $2
          )
        "#
    )
    .bind(user_id)
    .bind(keep)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
