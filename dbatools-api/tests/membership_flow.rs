mod support;

use anyhow::Result;
use uuid::Uuid;

use dbatools_api::error::ApiError;
use dbatools_api::memberships;
use dbatools_api::roles;
use dbatools_api::users;

use support::{seed_role, seed_user, TestDatabase};

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn duplicate_assignment_conflicts_and_leaves_one_row() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();

    let user = seed_user(&pool, "dup-user", true).await?;
    let role_id = seed_role(&pool, "dup-role").await?;

    let membership = memberships::assign(&pool, user.user_id, role_id, None).await?;
    assert_eq!(membership.user_id, user.user_id);
    assert_eq!(membership.role_id, role_id);
    assert!(membership.assigned_by.is_none());

    let err = memberships::assign(&pool, user.user_id, role_id, None)
        .await
        .expect_err("duplicate pair");
    assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user.user_id)
            .bind(role_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(count, 1);

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn assignment_to_missing_user_or_role_is_not_found() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();

    let user = seed_user(&pool, "fk-user", true).await?;
    let role_id = seed_role(&pool, "fk-role").await?;

    let err = memberships::assign(&pool, Uuid::new_v4(), role_id, None)
        .await
        .expect_err("dangling user id");
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");

    let err = memberships::assign(&pool, user.user_id, Uuid::new_v4(), None)
        .await
        .expect_err("dangling role id");
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn removal_is_idempotent() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();

    let user = seed_user(&pool, "rm-user", true).await?;
    let role_id = seed_role(&pool, "rm-role").await?;
    memberships::assign(&pool, user.user_id, role_id, None).await?;

    assert!(memberships::remove(&pool, user.user_id, role_id).await?);
    assert!(!memberships::remove(&pool, user.user_id, role_id).await?);
    assert!(memberships::find(&pool, user.user_id, role_id)
        .await?
        .is_none());

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn deleting_user_or_role_cascades_to_memberships() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();

    let user = seed_user(&pool, "cascade-user", true).await?;
    let other = seed_user(&pool, "cascade-other", true).await?;
    let role_a = seed_role(&pool, "cascade-role-a").await?;
    let role_b = seed_role(&pool, "cascade-role-b").await?;

    memberships::assign(&pool, user.user_id, role_a, None).await?;
    memberships::assign(&pool, user.user_id, role_b, None).await?;
    memberships::assign(&pool, other.user_id, role_a, None).await?;

    assert!(users::delete(&pool, user.user_id).await?);
    assert!(memberships::find(&pool, user.user_id, role_a).await?.is_none());
    assert!(memberships::find(&pool, user.user_id, role_b).await?.is_none());

    // The other user's grant is untouched by the cascade.
    assert!(memberships::find(&pool, other.user_id, role_a)
        .await?
        .is_some());

    assert!(roles::delete(&pool, role_a).await?);
    assert!(memberships::find(&pool, other.user_id, role_a)
        .await?
        .is_none());

    db.teardown().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration"), ignore = "enable with --features integration (requires Postgres: embedded or external)")]
async fn roles_for_user_returns_every_grant() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();

    let user = seed_user(&pool, "ordered-user", true).await?;
    let first = seed_role(&pool, "ordered-first").await?;
    let second = seed_role(&pool, "ordered-second").await?;

    memberships::assign(&pool, user.user_id, first, None).await?;
    memberships::assign(&pool, user.user_id, second, None).await?;

    let roles = memberships::roles_for_user(&pool, user.user_id).await?;
    let ids: Vec<_> = roles.iter().map(|role| role.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first) && ids.contains(&second));

    db.teardown().await?;
    Ok(())
}
