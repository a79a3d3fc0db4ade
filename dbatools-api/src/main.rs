use std::net::SocketAddr;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use dbatools_api::{
    auth_handlers, bootstrap, config::Settings, permission_handlers, role_handlers, user_handlers,
    AppState,
};

async fn root() -> Json<Value> {
    Json(json!({
        "message": "DBA Tools API",
        "health": "/health",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/logout", post(auth_handlers::logout));

    let user_routes = Router::new()
        .route("/me", get(user_handlers::get_me))
        .route("/", get(user_handlers::list_users))
        .route(
            "/:user_id",
            get(user_handlers::get_user)
                .put(user_handlers::update_user)
                .delete(user_handlers::delete_user),
        );

    let role_routes = Router::new()
        .route(
            "/",
            get(role_handlers::list_roles).post(role_handlers::create_role),
        )
        .route(
            "/:role_id",
            get(role_handlers::get_role)
                .put(role_handlers::update_role)
                .delete(role_handlers::delete_role),
        )
        .route(
            "/users/:user_id/assign/:role_id",
            post(role_handlers::assign_role),
        )
        .route(
            "/users/:user_id/remove/:role_id",
            delete(role_handlers::remove_role),
        );

    let permission_routes = Router::new()
        .route(
            "/",
            get(permission_handlers::list_permissions).post(permission_handlers::create_permission),
        )
        .route(
            "/:permission_id",
            get(permission_handlers::get_permission)
                .put(permission_handlers::update_permission)
                .delete(permission_handlers::delete_permission),
        )
        .route(
            "/resource/:resource",
            get(permission_handlers::list_by_resource),
        )
        .route("/action/:action", get(permission_handlers::list_by_action));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/permissions", permission_routes)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::from_env()?;

    let db = PgPool::connect(&settings.database_url).await?;
    let state = AppState::new(db, settings.clone());

    bootstrap::ensure_default_roles(&state.db).await?;
    if let Some(account) = &settings.admin_account {
        bootstrap::ensure_admin_user(&state.db, &state.passwords, account).await?;
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE]);

    let app = router(state).layer(cors);

    let ip: std::net::IpAddr = settings.host.parse()?;
    let addr = SocketAddr::from((ip, settings.port));

    info!(%addr, app = %settings.app_name, "starting dbatools-api");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
