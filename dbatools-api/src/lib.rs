pub mod app;
pub mod auth;
pub mod auth_handlers;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod memberships;
pub mod models;
pub mod password;
pub mod permission_handlers;
pub mod permissions;
pub mod role_handlers;
pub mod roles;
pub mod tokens;
pub mod user_handlers;
pub mod users;

pub use app::AppState;
