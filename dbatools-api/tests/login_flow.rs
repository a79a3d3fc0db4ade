mod support;

use anyhow::Result;
use chrono::Utc;

use common_rbac::{TokenVerifier, VerifierConfig};
use dbatools_api::auth;
use dbatools_api::bootstrap;
use dbatools_api::error::ApiError;
use dbatools_api::memberships;
use dbatools_api::users::{self, NewUser};
use dbatools_api::AppState;

use support::{seed_user, test_settings, TestDatabase};

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn login_issues_verifiable_token_and_stamps_last_login() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();
    let settings = test_settings("unused");
    let state = AppState::new(pool.clone(), settings.clone());

    let seeded = seed_user(&pool, "alice", true).await?;
    let before = Utc::now();

    let token = auth::login(
        &pool,
        &state.signer,
        &state.passwords,
        &seeded.username,
        &seeded.password,
    )
    .await?;

    assert_eq!(token.token_type, "bearer");
    assert_eq!(token.expires_in, settings.access_token_expire_seconds());
    assert_eq!(token.user_id, seeded.user_id);
    assert_eq!(token.username, seeded.username);

    let verifier = TokenVerifier::new(settings.secret_key.as_bytes(), VerifierConfig::default());
    let claims = verifier.verify(&token.access_token).expect("valid token");
    assert_eq!(claims.subject, seeded.username);

    let user = users::find_by_id(&pool, seeded.user_id)
        .await?
        .expect("user exists");
    let stamped = user.last_login.expect("last_login stamped");
    assert!(stamped >= before);

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();
    let state = AppState::new(pool.clone(), test_settings("unused"));

    let seeded = seed_user(&pool, "bob", true).await?;
    let disabled = seed_user(&pool, "mallory", false).await?;

    // Wrong password.
    let err = auth::login(&pool, &state.signer, &state.passwords, "bob", "not-the-password")
        .await
        .expect_err("wrong password");
    assert!(matches!(err, ApiError::InvalidCredentials), "{err:?}");

    // Unknown username.
    let err = auth::login(
        &pool,
        &state.signer,
        &state.passwords,
        "nobody",
        &seeded.password,
    )
    .await
    .expect_err("unknown user");
    assert!(matches!(err, ApiError::InvalidCredentials), "{err:?}");

    // Correct password but disabled account.
    let err = auth::login(
        &pool,
        &state.signer,
        &state.passwords,
        &disabled.username,
        &disabled.password,
    )
    .await
    .expect_err("disabled account");
    assert!(matches!(err, ApiError::InvalidCredentials), "{err:?}");

    // None of the failures stamps last_login.
    let user = users::find_by_username(&pool, "bob").await?.expect("bob");
    assert!(user.last_login.is_none());

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn registration_grants_the_default_viewer_role() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();
    let state = AppState::new(pool.clone(), test_settings("unused"));

    bootstrap::ensure_default_roles(&pool).await?;

    let password_hash = auth::hash_blocking(&state.passwords, "a-decent-password").await?;
    let user = users::create_with_default_role(
        &pool,
        NewUser {
            username: "carol".to_string(),
            email: "carol@example.com".to_string(),
            password_hash,
            full_name: None,
        },
    )
    .await?;

    let roles = memberships::roles_for_user(&pool, user.id).await?;
    let names = auth::role_names(&roles);
    assert_eq!(names, vec!["viewer".to_string()]);

    db.teardown().await?;
    Ok(())
}
