use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{membership_insert_error, ApiError};
use crate::models::{Membership, Role};

const MEMBERSHIP_COLUMNS: &str = "id, user_id, role_id, assigned_at, assigned_by";

/// Grant `role_id` to `user_id`, recording who assigned it. The schema's
/// unique (user_id, role_id) constraint is the single arbiter of
/// duplicates; a dangling reference surfaces through the foreign keys.
pub async fn assign(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    role_id: Uuid,
    assigned_by: Option<Uuid>,
) -> Result<Membership, ApiError> {
    sqlx::query_as::<_, Membership>(&format!(
        "INSERT INTO user_roles (id, user_id, role_id, assigned_by)
         VALUES ($1, $2, $3, $4)
         RETURNING {MEMBERSHIP_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(role_id)
    .bind(assigned_by)
    .fetch_one(db)
    .await
    .map_err(membership_insert_error)
}

/// Idempotent removal: returns whether the pair existed.
pub async fn remove(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
        .bind(user_id)
        .bind(role_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn roles_for_user(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name, r.display_name, r.description, r.is_active, r.created_at
         FROM roles r
         JOIN user_roles ur ON ur.role_id = r.id
         WHERE ur.user_id = $1
         ORDER BY ur.assigned_at, r.id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>(&format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM user_roles WHERE user_id = $1 AND role_id = $2"
    ))
    .bind(user_id)
    .bind(role_id)
    .fetch_optional(db)
    .await
}
