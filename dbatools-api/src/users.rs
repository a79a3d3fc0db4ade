use sqlx::{PgExecutor, PgPool};
use tracing::warn;
use uuid::Uuid;

use common_rbac::ROLE_VIEWER;

use crate::error::{conflict_on_unique, validate_page, ApiError};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, is_active, \
                            is_superuser, last_login, created_at, updated_at";

const MAX_PAGE_SIZE: i64 = 1000;

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn find_by_id(
    db: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_username(
    db: impl PgExecutor<'_>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(db)
    .await
}

pub async fn find_by_email(
    db: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(db)
        .await
}

/// Bounded, creation-ordered listing. Bounds outside skip >= 0 and
/// 1 <= limit <= 1000 are rejected.
pub async fn list(
    db: impl PgExecutor<'_>,
    offset: i64,
    limit: i64,
) -> Result<Vec<User>, ApiError> {
    validate_page(offset, limit, MAX_PAGE_SIZE)?;
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(users)
}

/// Insert a new user. Duplicate username or email surfaces as Conflict
/// straight from the database constraint.
pub async fn create(db: impl PgExecutor<'_>, new_user: NewUser) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, username, email, password_hash, full_name)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.full_name)
    .fetch_one(db)
    .await
    .map_err(|err| conflict_on_unique(err, "Username or email"))
}

/// Create a user and grant the default `viewer` role (when it exists)
/// inside one transaction, so no observer sees a user without its
/// default membership.
pub async fn create_with_default_role(pool: &PgPool, new_user: NewUser) -> Result<User, ApiError> {
    let mut tx = pool.begin().await?;

    let user = create(&mut *tx, new_user).await?;

    let viewer: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
        .bind(ROLE_VIEWER)
        .fetch_optional(&mut *tx)
        .await?;

    if let Some((role_id,)) = viewer {
        sqlx::query(
            "INSERT INTO user_roles (id, user_id, role_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(user)
}

pub async fn update(
    db: impl PgExecutor<'_>,
    id: Uuid,
    changes: UserChanges,
) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET email = COALESCE($2, email),
             full_name = COALESCE($3, full_name),
             is_active = COALESCE($4, is_active),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(changes.email)
    .bind(changes.full_name)
    .bind(changes.is_active)
    .fetch_optional(db)
    .await
    .map_err(|err| conflict_on_unique(err, "Email"))
}

/// Delete a user; memberships referencing it are removed by the cascade
/// rule in the schema. Returns whether the row existed.
pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Best-effort stamp after a successful login. Callers treat failure as
/// non-fatal; the login itself has already succeeded.
pub async fn record_last_login(db: impl PgExecutor<'_>, id: Uuid) {
    let result = sqlx::query("UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await;

    if let Err(err) = result {
        warn!(user_id = %id, error = ?err, "failed to record last login");
    }
}
