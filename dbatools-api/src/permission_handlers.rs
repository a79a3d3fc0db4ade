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
use crate::models::Permission;
use crate::permissions::{self, NewPermission, PermissionChanges};
use crate::user_handlers::Pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PermissionCreate {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Permission>>> {
    auth::current_user(&state.db, &auth.claims).await?;
    let listed = permissions::list(&state.db, page.skip, page.limit).await?;
    Ok(Json(listed))
}

pub async fn get_permission(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(permission_id): Path<Uuid>,
) -> ApiResult<Json<Permission>> {
    auth::current_user(&state.db, &auth.claims).await?;
    let permission = permissions::find_by_id(&state.db, permission_id)
        .await?
        .ok_or(ApiError::NotFound("Permission"))?;
    Ok(Json(permission))
}

pub async fn list_by_resource(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(resource): Path<String>,
) -> ApiResult<Json<Vec<Permission>>> {
    auth::current_user(&state.db, &auth.claims).await?;
    let listed = permissions::list_by_resource(&state.db, &resource).await?;
    Ok(Json(listed))
}

pub async fn list_by_action(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(action): Path<String>,
) -> ApiResult<Json<Vec<Permission>>> {
    auth::current_user(&state.db, &auth.claims).await?;
    let listed = permissions::list_by_action(&state.db, &action).await?;
    Ok(Json(listed))
}

pub async fn create_permission(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<PermissionCreate>,
) -> ApiResult<(StatusCode, Json<Permission>)> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Invalid("Permission name is required".to_string()));
    }

    let permission = permissions::create(
        &state.db,
        NewPermission {
            name,
            display_name: request.display_name,
            description: request.description,
            resource: request.resource,
            action: request.action,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn update_permission(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(permission_id): Path<Uuid>,
    Json(request): Json<PermissionUpdate>,
) -> ApiResult<Json<Permission>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    let permission = permissions::update(
        &state.db,
        permission_id,
        PermissionChanges {
            display_name: request.display_name,
            description: request.description,
            resource: request.resource,
            action: request.action,
            is_active: request.is_active,
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Permission"))?;
    Ok(Json(permission))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn delete_permission(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(permission_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = auth::current_user(&state.db, &auth.claims).await?;
    auth::require_admin(&state.db, &caller).await?;

    if !permissions::delete(&state.db, permission_id).await? {
        return Err(ApiError::NotFound("Permission"));
    }
    Ok(Json(MessageResponse {
        message: "Permission deleted",
    }))
}
