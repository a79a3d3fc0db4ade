use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use common_rbac::{DEFAULT_ROLES, ROLE_ADMIN};

use crate::auth;
use crate::config::AdminAccount;
use crate::error::ApiResult;
use crate::models::User;
use crate::password::PasswordContext;
use crate::users;

/// Seed the built-in roles. Safe to run on every start; existing rows
/// are left untouched.
pub async fn ensure_default_roles(pool: &PgPool) -> ApiResult<()> {
    for (name, display_name, description) in DEFAULT_ROLES {
        sqlx::query(
            "INSERT INTO roles (id, name, display_name, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(display_name)
        .bind(description)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Create the administrator account once, then grant it the `admin`
/// role. Re-running against an existing account only re-asserts the
/// role grant; the stored password is never overwritten.
pub async fn ensure_admin_user(
    pool: &PgPool,
    passwords: &PasswordContext,
    account: &AdminAccount,
) -> ApiResult<()> {
    let user = match users::find_by_username(pool, &account.username).await? {
        Some(existing) => existing,
        None => {
            let password_hash = auth::hash_blocking(passwords, &account.password).await?;
            let user: User = sqlx::query_as(
                "INSERT INTO users (id, username, email, password_hash, is_superuser)
                 VALUES ($1, $2, $3, $4, TRUE)
                 RETURNING id, username, email, password_hash, full_name, is_active, \
                           is_superuser, last_login, created_at, updated_at",
            )
            .bind(Uuid::new_v4())
            .bind(&account.username)
            .bind(&account.email)
            .bind(password_hash)
            .fetch_one(pool)
            .await?;
            info!(username = %account.username, "created administrator account");
            user
        }
    };

    sqlx::query(
        "INSERT INTO user_roles (id, user_id, role_id)
         SELECT $1, $2, id FROM roles WHERE name = $3
         ON CONFLICT (user_id, role_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(ROLE_ADMIN)
    .execute(pool)
    .await?;

    Ok(())
}
