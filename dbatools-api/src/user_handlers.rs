use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common_rbac::{ensure_admin, AuthContext};

use crate::auth::{self, role_names};
use crate::error::{ApiError, ApiResult};
use crate::memberships;
use crate::models::User;
use crate::users::{self, UserChanges};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub roles: Vec<String>,
}

impl UserResponse {
    pub fn new(user: User, roles: Vec<String>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            last_login: user.last_login,
            roles,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<UserResponse>> {
    let user = auth::current_user(&state.db, &auth.claims).await?;
    let roles = memberships::roles_for_user(&state.db, user.id).await?;
    let names = role_names(&roles);
    Ok(Json(UserResponse::new(user, names)))
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    let listed = users::list(&state.db, page.skip, page.limit).await?;
    let mut responses = Vec::with_capacity(listed.len());
    for user in listed {
        let roles = memberships::roles_for_user(&state.db, user.id).await?;
        let names = role_names(&roles);
        responses.push(UserResponse::new(user, names));
    }

    Ok(Json(responses))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    ensure_self_or_admin(&state, &caller, user_id).await?;

    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    let roles = memberships::roles_for_user(&state.db, user.id).await?;
    let names = role_names(&roles);
    Ok(Json(UserResponse::new(user, names)))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<UserResponse>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    ensure_self_or_admin(&state, &caller, user_id).await?;

    let changes = UserChanges {
        email: update.email,
        full_name: update.full_name,
        is_active: update.is_active,
    };
    let user = users::update(&state.db, user_id, changes)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    let roles = memberships::roles_for_user(&state.db, user.id).await?;
    let names = role_names(&roles);
    Ok(Json(UserResponse::new(user, names)))
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    if !users::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound("User"));
    }

    Ok(Json(DeletedResponse {
        message: "User deleted",
    }))
}

/// Users may act on their own record; anything else needs admin standing.
async fn ensure_self_or_admin(state: &AppState, caller: &User, target: Uuid) -> ApiResult<()> {
    if caller.id == target {
        return Ok(());
    }

    let roles = memberships::roles_for_user(&state.db, caller.id).await?;
    ensure_admin(caller.is_superuser, &role_names(&roles))?;
    Ok(())
}
