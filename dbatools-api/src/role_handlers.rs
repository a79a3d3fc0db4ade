use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common_rbac::AuthContext;

use crate::auth;
use crate::error::{ApiError, ApiResult};
use crate::memberships;
use crate::models::{Membership, Role};
use crate::roles::{self, NewRole, RoleChanges};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RoleListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_limit() -> i64 {
    100
}

fn default_active_only() -> bool {
    true
}

pub async fn list_roles(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<RoleListQuery>,
) -> ApiResult<Json<Vec<Role>>> {
    auth::current_user(&state.db, &auth.claims).await?;
    let listed = roles::list(&state.db, query.skip, query.limit, query.active_only).await?;
    Ok(Json(listed))
}

pub async fn get_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<Role>> {
    auth::current_user(&state.db, &auth.claims).await?;
    let role = roles::find_by_id(&state.db, role_id)
        .await?
        .ok_or(ApiError::NotFound("Role"))?;
    Ok(Json(role))
}

pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<RoleCreate>,
) -> ApiResult<(StatusCode, Json<Role>)> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Invalid("Role name is required".to_string()));
    }

    let role = roles::create(
        &state.db,
        NewRole {
            name,
            display_name: request.display_name,
            description: request.description,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(role_id): Path<Uuid>,
    Json(request): Json<RoleUpdate>,
) -> ApiResult<Json<Role>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    let role = roles::update(
        &state.db,
        role_id,
        RoleChanges {
            display_name: request.display_name,
            description: request.description,
            is_active: request.is_active,
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Role"))?;
    Ok(Json(role))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    if !roles::delete(&state.db, role_id).await? {
        return Err(ApiError::NotFound("Role"));
    }
    Ok(Json(MessageResponse {
        message: "Role deleted",
    }))
}

pub async fn assign_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    let membership = memberships::assign(&state.db, user_id, role_id, Some(caller.id)).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn remove_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    if !memberships::remove(&state.db, user_id, role_id).await? {
        return Err(ApiError::NotFound("Membership"));
    }
    Ok(Json(MessageResponse {
        message: "Role removed",
    }))
}
