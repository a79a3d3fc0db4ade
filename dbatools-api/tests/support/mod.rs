use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use dirs::cache_dir;
use jsonwebtoken::Algorithm;
use pg_embed::pg_enums::PgAuthMethod;
use pg_embed::pg_fetch::{PgFetchSettings, PG_V13};
use pg_embed::postgres::{PgEmbed, PgSettings};
use portpicker::pick_unused_port;
use rand_core::OsRng;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

use dbatools_api::config::Settings;
use dbatools_api::password::Scheme;

pub struct TestDatabase {
    pool: PgPool,
    embedded: Option<EmbeddedPg>,
}

impl TestDatabase {
    pub async fn setup() -> Result<Option<Self>> {
        if env::var("DBATOOLS_TEST_DATABASE_URL").is_err()
            && !env_flag_enabled("DBATOOLS_TEST_USE_EMBED")
        {
            eprintln!(
                "Skipping dbatools-api integration tests: set DBATOOLS_TEST_DATABASE_URL or DBATOOLS_TEST_USE_EMBED=1 to run them.",
            );
            return Ok(None);
        }

        let mut embedded = None;
        let database_url = if let Ok(url) = env::var("DBATOOLS_TEST_DATABASE_URL") {
            url
        } else {
            if env_flag_enabled("DBATOOLS_TEST_EMBED_CLEAR_CACHE") {
                if let Some(cache_dir) = cache_dir() {
                    let _ = std::fs::remove_dir_all(cache_dir.join("pg-embed"));
                }
            }

            let temp = tempdir()?;
            let port = pick_unused_port()
                .context("failed to find available port for embedded Postgres")?;

            let mut fetch_settings = PgFetchSettings::default();
            fetch_settings.version = PG_V13;

            let mut pg = PgEmbed::new(
                PgSettings {
                    database_dir: temp.path().to_path_buf(),
                    port,
                    user: "postgres".to_string(),
                    password: "postgres".to_string(),
                    auth_method: PgAuthMethod::Plain,
                    persistent: false,
                    timeout: Some(Duration::from_secs(30)),
                    migration_dir: None,
                },
                fetch_settings,
            )
            .await?;

            pg.setup().await?;
            pg.start_db().await?;

            let uri = format!("{}/postgres", pg.db_uri);
            embedded = Some(EmbeddedPg {
                pg,
                _temp_dir: temp,
            });
            uri
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        if embedded.is_some() || env_flag_enabled("DBATOOLS_TEST_APPLY_MIGRATIONS") {
            run_migrations(&pool).await?;
        }

        Ok(Some(Self { pool, embedded }))
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }

    pub async fn teardown(self) -> Result<()> {
        if let Some(embedded) = self.embedded {
            embedded.shutdown().await;
        }
        Ok(())
    }
}

struct EmbeddedPg {
    pg: PgEmbed,
    _temp_dir: TempDir,
}

impl EmbeddedPg {
    async fn shutdown(mut self) {
        let _ = self.pg.stop_db().await;
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrations_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let mut entries = std::fs::read_dir(&migrations_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        let sql = std::fs::read_to_string(&path)?;
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                continue;
            }
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

#[allow(dead_code)]
pub fn test_settings(database_url: &str) -> Settings {
    Settings {
        app_name: "dbatools-api-test".to_string(),
        database_url: database_url.to_string(),
        secret_key: "integration-test-secret".to_string(),
        token_algorithm: Algorithm::HS256,
        access_token_expire_minutes: 30,
        token_leeway_seconds: 0,
        password_scheme: Scheme::Argon2,
        password_scheme_deprecated: "auto".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_account: None,
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeededUser {
    pub user_id: Uuid,
    pub username: String,
    pub password: String,
}

#[allow(dead_code)]
pub async fn seed_user(pool: &PgPool, username: &str, is_active: bool) -> Result<SeededUser> {
    let user_id = Uuid::new_v4();
    let password = "CorrectHorseBatteryStaple!".to_string();
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("failed to hash seed password: {err}"))?
        .to_string();

    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, is_active)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(&password_hash)
    .bind(is_active)
    .execute(pool)
    .await?;

    Ok(SeededUser {
        user_id,
        username: username.to_string(),
        password,
    })
}

#[allow(dead_code)]
pub async fn seed_role(pool: &PgPool, name: &str) -> Result<Uuid> {
    let role_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO roles (id, name, display_name)
         VALUES ($1, $2, $3)",
    )
    .bind(role_id)
    .bind(name)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(role_id)
}

fn env_flag_enabled(key: &str) -> bool {
    matches!(env::var(key), Ok(value) if is_truthy(value.as_str()))
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}
