use anyhow::{anyhow, Context, Result};
use jsonwebtoken::Algorithm;
use std::env;

use crate::password::Scheme;

/// Process-wide configuration, built once in `main` and passed by
/// reference into every service constructor.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub database_url: String,
    pub secret_key: String,
    pub token_algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub token_leeway_seconds: u32,
    pub password_scheme: Scheme,
    /// Marker for schemes considered deprecated, kept so a future
    /// re-hash-on-login pass can consult it. Not exercised yet.
    pub password_scheme_deprecated: String,
    pub host: String,
    pub port: u16,
    pub admin_account: Option<AdminAccount>,
}

/// Bootstrap credentials for the one-time administrator account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY must be set")?;

        let token_algorithm = env::var("TOKEN_ALGORITHM")
            .ok()
            .map(|value| parse_algorithm(&value))
            .transpose()
            .context("Failed to parse TOKEN_ALGORITHM")?
            .unwrap_or(Algorithm::HS256);

        let access_token_expire_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .map(|value| parse_positive(&value))
            .transpose()
            .context("Failed to parse ACCESS_TOKEN_EXPIRE_MINUTES")?
            .unwrap_or(30);

        let token_leeway_seconds = env::var("TOKEN_LEEWAY_SECONDS")
            .ok()
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|err| anyhow!("Invalid TOKEN_LEEWAY_SECONDS '{value}': {err}"))
            })
            .transpose()?
            .unwrap_or(0);

        let password_scheme = env::var("PASSWORD_SCHEME")
            .ok()
            .map(|value| parse_scheme(&value))
            .transpose()
            .context("Failed to parse PASSWORD_SCHEME")?
            .unwrap_or(Scheme::Argon2);

        let password_scheme_deprecated =
            env::var("PASSWORD_SCHEME_DEPRECATED").unwrap_or_else(|_| "auto".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(8000);

        let admin_account = admin_account_from_env()?;

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "DBA Tools API".to_string()),
            database_url,
            secret_key,
            token_algorithm,
            access_token_expire_minutes,
            token_leeway_seconds,
            password_scheme,
            password_scheme_deprecated,
            host,
            port,
            admin_account,
        })
    }

    pub fn access_token_expire_seconds(&self) -> i64 {
        self.access_token_expire_minutes * 60
    }
}

fn admin_account_from_env() -> Result<Option<AdminAccount>> {
    let password = match env::var("ADMIN_PASSWORD") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(None),
    };

    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

    Ok(Some(AdminAccount {
        username,
        password,
        email,
    }))
}

fn parse_algorithm(value: &str) -> Result<Algorithm> {
    match value.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(anyhow!(
            "Unsupported token algorithm '{other}'. Use HS256, HS384, or HS512."
        )),
    }
}

fn parse_scheme(value: &str) -> Result<Scheme> {
    match value.trim().to_ascii_lowercase().as_str() {
        "argon2" => Ok(Scheme::Argon2),
        other => Err(anyhow!("Unsupported password scheme '{other}'")),
    }
}

fn parse_positive(value: &str) -> Result<i64> {
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|err| anyhow!("Invalid integer '{value}': {err}"))?;
    if parsed <= 0 {
        return Err(anyhow!("Expected a positive value, got {parsed}"));
    }
    Ok(parsed)
}
