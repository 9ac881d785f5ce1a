mod common;

use std::sync::Arc;

use musiqhub::{
    auth::{self, SqliteSessionStore},
    domain::CreateUserRequest,
    error::AppError,
    repository::{SqliteUserRepository, UserRepository},
    service::AuthService,
};

async fn auth_service() -> anyhow::Result<(AuthService, Arc<SqliteUserRepository>)> {
    let pool = common::memory_pool().await?;
    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let service = AuthService::new(
        users.clone(),
        Arc::new(SqliteSessionStore::new(pool)),
        24,
        vec!["moderator".to_string()],
    );
    Ok((service, users))
}

#[tokio::test]
async fn test_register_login_logout() -> anyhow::Result<()> {
    let (service, _) = auth_service().await?;

    let (user, token) = service.register("alice@example.com", "secret1", Some("Alice")).await?;
    assert_eq!(user.identifier, "alice@example.com");
    assert_eq!(user.shown_name(), "Alice");
    assert_ne!(user.password_hash, "secret1");

    let current = service.current_user(&token).await?;
    assert_eq!(current.map(|u| u.id), Some(user.id));

    let (again, second) = service.login("alice@example.com", "secret1").await?;
    assert_eq!(again.id, user.id);
    assert_ne!(second, token);

    service.logout(&token).await?;
    service.logout(&token).await?;
    assert!(service.current_user(&token).await?.is_none());
    assert!(service.current_user(&second).await?.is_some());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_leaves_store_unchanged() -> anyhow::Result<()> {
    let (service, users) = auth_service().await?;

    service.register("bob", "first-password", None).await?;
    let before = users.find_by_identifier("bob").await?.map(|u| u.password_hash);

    let result = service.register("bob", "other-password", None).await;
    assert!(matches!(result, Err(AppError::DuplicateIdentifier(_))));

    assert_eq!(users.count().await?, 1);
    let after = users.find_by_identifier("bob").await?.map(|u| u.password_hash);
    assert_eq!(before, after);

    assert!(service.login("bob", "first-password").await.is_ok());
    assert!(matches!(
        service.login("bob", "other-password").await,
        Err(AppError::InvalidCredentials)
    ));

    Ok(())
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() -> anyhow::Result<()> {
    let (service, _) = auth_service().await?;
    service.register("carol", "secret1", None).await?;

    let wrong_password = service.login("carol", "nope-nope").await;
    let unknown_user = service.login("nobody", "secret1").await;

    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown_user, Err(AppError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn test_registration_validation() -> anyhow::Result<()> {
    let (service, users) = auth_service().await?;

    assert!(matches!(
        service.register("dave", "12345", None).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service.register("   ", "secret1", None).await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(users.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_configured_admin_name_is_reserved() -> anyhow::Result<()> {
    let (service, users) = auth_service().await?;

    let result = service.register("moderator", "secret1", None).await;
    assert!(matches!(result, Err(AppError::DuplicateIdentifier(_))));
    assert!(users.find_by_identifier("moderator").await?.is_none());

    let (regular, _) = service.register("erin", "secret1", None).await?;
    assert!(!service.is_admin(&regular));

    Ok(())
}

#[tokio::test]
async fn test_admin_from_flag_or_configuration() -> anyhow::Result<()> {
    let (service, users) = auth_service().await?;

    for (identifier, is_admin) in [("moderator", false), ("AdminMusiq", true)] {
        users
            .create(CreateUserRequest {
                identifier: identifier.to_string(),
                display_name: None,
                password_hash: auth::hash_password("secret1")?,
                is_admin,
            })
            .await?;
    }

    for identifier in ["moderator", "AdminMusiq"] {
        let (user, _) = service.login(identifier, "secret1").await?;
        assert!(service.is_admin(&user), "{} should be admin", identifier);
    }

    Ok(())
}
