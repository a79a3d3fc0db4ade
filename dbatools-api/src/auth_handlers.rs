use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, role_names, TokenResponse};
use crate::bootstrap;
use crate::error::{ApiError, ApiResult};
use crate::memberships;
use crate::user_handlers::UserResponse;
use crate::users::{self, NewUser};
use crate::AppState;

const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_string();

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ApiError::Invalid(format!(
            "Username must be at least {MIN_USERNAME_LENGTH} characters"
        )));
    }
    if !email.contains('@') {
        return Err(ApiError::Invalid("Invalid email address".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Invalid(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    // Registration must be able to grant the default role even on a
    // fresh database.
    bootstrap::ensure_default_roles(&state.db).await?;

    let password_hash = auth::hash_blocking(&state.passwords, &request.password).await?;
    let user = users::create_with_default_role(
        &state.db,
        NewUser {
            username,
            email,
            password_hash,
            full_name: request.full_name,
        },
    )
    .await?;

    let roles = memberships::roles_for_user(&state.db, user.id).await?;
    let names = role_names(&roles);
    Ok((StatusCode::CREATED, Json(UserResponse::new(user, names))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = auth::login(
        &state.db,
        &state.signer,
        &state.passwords,
        &request.username,
        &request.password,
    )
    .await?;
    Ok(Json(token))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// Tokens are stateless; logout is client-side disposal. Kept so clients
/// have a uniform endpoint to call.
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logged out",
    })
}
