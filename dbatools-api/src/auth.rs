use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use common_rbac::Claims;

use crate::error::{ApiError, ApiResult};
use crate::models::{Role, User};
use crate::password::PasswordContext;
use crate::tokens::TokenSigner;
use crate::users;

/// Successful login payload, shape fixed by the token wire contract.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user_id: Uuid,
    pub username: String,
}

/// Authenticate and issue an access token.
///
/// Missing user, wrong password, and disabled account all collapse into
/// the same `InvalidCredentials` outcome; distinguishing them would hand
/// callers a username-enumeration oracle.
pub async fn login(
    db: &PgPool,
    signer: &TokenSigner,
    passwords: &PasswordContext,
    username: &str,
    password: &str,
) -> ApiResult<TokenResponse> {
    let user = match users::find_by_username(db, username).await? {
        Some(user) => user,
        None => return Err(ApiError::InvalidCredentials),
    };

    if !verify_blocking(passwords, password, &user.password_hash).await? {
        return Err(ApiError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(ApiError::InvalidCredentials);
    }

    let issued = signer
        .issue_access(&user.username)
        .map_err(|err| ApiError::Internal(format!("failed to issue access token: {err}")))?;

    // Best-effort; a failed stamp must not fail the login.
    users::record_last_login(db, user.id).await;

    info!(user_id = %user.id, username = %user.username, "user logged in");

    Ok(TokenResponse {
        access_token: issued.access_token,
        token_type: issued.token_type,
        expires_in: issued.expires_in,
        user_id: user.id,
        username: user.username,
    })
}

/// Resolve verified claims to the live user row for protected handlers.
pub async fn current_user(db: &PgPool, claims: &Claims) -> ApiResult<User> {
    let user = users::find_by_username(db, &claims.subject)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is disabled".to_string()));
    }

    Ok(user)
}

pub fn role_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|role| role.name.clone()).collect()
}

/// Load the caller's roles and require admin standing (superuser flag or
/// the `admin` role).
pub async fn require_admin(db: &PgPool, user: &User) -> ApiResult<Vec<Role>> {
    let roles = crate::memberships::roles_for_user(db, user.id).await?;
    common_rbac::ensure_admin(user.is_superuser, &role_names(&roles))?;
    Ok(roles)
}

/// Argon2 verification is CPU-expensive by design; keep it off the async
/// workers.
pub async fn verify_blocking(
    passwords: &PasswordContext,
    password: &str,
    hash: &str,
) -> ApiResult<bool> {
    let passwords = passwords.clone();
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
        .await
        .map_err(|err| ApiError::Internal(format!("verification task failed: {err}")))
}

/// Hashing twin of [`verify_blocking`].
pub async fn hash_blocking(passwords: &PasswordContext, password: &str) -> ApiResult<String> {
    let passwords = passwords.clone();
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .map_err(|err| ApiError::Internal(format!("hashing task failed: {err}")))?
}
