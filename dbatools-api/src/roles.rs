use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{conflict_on_unique, validate_page, ApiError};
use crate::models::Role;

const ROLE_COLUMNS: &str = "id, name, display_name, description, is_active, created_at";

const MAX_PAGE_SIZE: i64 = 1000;

pub struct NewRole {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct RoleChanges {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn find_by_id(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_name(
    db: impl PgExecutor<'_>,
    name: &str,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1"))
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn list(
    db: impl PgExecutor<'_>,
    offset: i64,
    limit: i64,
    active_only: bool,
) -> Result<Vec<Role>, ApiError> {
    validate_page(offset, limit, MAX_PAGE_SIZE)?;
    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles
         WHERE is_active OR NOT $3
         ORDER BY created_at, id
         LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .bind(active_only)
    .fetch_all(db)
    .await?;
    Ok(roles)
}

pub async fn create(db: impl PgExecutor<'_>, new_role: NewRole) -> Result<Role, ApiError> {
    sqlx::query_as::<_, Role>(&format!(
        "INSERT INTO roles (id, name, display_name, description)
         VALUES ($1, $2, $3, $4)
         RETURNING {ROLE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(new_role.name)
    .bind(new_role.display_name)
    .bind(new_role.description)
    .fetch_one(db)
    .await
    .map_err(|err| conflict_on_unique(err, "Role name"))
}

pub async fn update(
    db: impl PgExecutor<'_>,
    id: Uuid,
    changes: RoleChanges,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(&format!(
        "UPDATE roles
         SET display_name = COALESCE($2, display_name),
             description = COALESCE($3, description),
             is_active = COALESCE($4, is_active)
         WHERE id = $1
         RETURNING {ROLE_COLUMNS}"
    ))
    .bind(id)
    .bind(changes.display_name)
    .bind(changes.description)
    .bind(changes.is_active)
    .fetch_optional(db)
    .await
}

/// Delete a role; memberships referencing it cascade away in the schema.
pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
