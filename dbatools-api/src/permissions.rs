use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{conflict_on_unique, validate_page, ApiError};
use crate::models::Permission;

const PERMISSION_COLUMNS: &str =
    "id, name, display_name, description, resource, action, is_active, created_at";

const MAX_PAGE_SIZE: i64 = 1000;

pub struct NewPermission {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Default)]
pub struct PermissionChanges {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn find_by_id(
    db: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_by_name(
    db: impl PgExecutor<'_>,
    name: &str,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn list(
    db: impl PgExecutor<'_>,
    offset: i64,
    limit: i64,
) -> Result<Vec<Permission>, ApiError> {
    validate_page(offset, limit, MAX_PAGE_SIZE)?;
    let permissions = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY created_at, id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(permissions)
}

pub async fn list_by_resource(
    db: impl PgExecutor<'_>,
    resource: &str,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE resource = $1 ORDER BY created_at, id"
    ))
    .bind(resource)
    .fetch_all(db)
    .await
}

pub async fn list_by_action(
    db: impl PgExecutor<'_>,
    action: &str,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE action = $1 ORDER BY created_at, id"
    ))
    .bind(action)
    .fetch_all(db)
    .await
}

pub async fn create(
    db: impl PgExecutor<'_>,
    new_permission: NewPermission,
) -> Result<Permission, ApiError> {
    sqlx::query_as::<_, Permission>(&format!(
        "INSERT INTO permissions (id, name, display_name, description, resource, action)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {PERMISSION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(new_permission.name)
    .bind(new_permission.display_name)
    .bind(new_permission.description)
    .bind(new_permission.resource)
    .bind(new_permission.action)
    .fetch_one(db)
    .await
    .map_err(|err| conflict_on_unique(err, "Permission name"))
}

pub async fn update(
    db: impl PgExecutor<'_>,
    id: Uuid,
    changes: PermissionChanges,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "UPDATE permissions
         SET display_name = COALESCE($2, display_name),
             description = COALESCE($3, description),
             resource = COALESCE($4, resource),
             action = COALESCE($5, action),
             is_active = COALESCE($6, is_active)
         WHERE id = $1
         RETURNING {PERMISSION_COLUMNS}"
    ))
    .bind(id)
    .bind(changes.display_name)
    .bind(changes.description)
    .bind(changes.resource)
    .bind(changes.action)
    .bind(changes.is_active)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
