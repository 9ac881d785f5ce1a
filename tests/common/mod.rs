#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use musiqhub::{
    auth::SqliteSessionStore,
    config::{Settings, MIN_SECRET_LEN},
    repository::{SqliteAnnouncementRepository, SqliteUserRepository},
    service::{AnnouncementService, AuthService, ServiceContext},
};

/// In-memory database with the schema applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

pub fn test_settings(uploads_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.auth.session_secret = "s".repeat(MIN_SECRET_LEN);
    settings.auth.admin_identifiers = vec!["moderator".to_string()];
    settings.server.uploads_dir = uploads_dir.to_string_lossy().into_owned();
    settings
}

pub fn sqlite_services(pool: &SqlitePool, settings: &Settings) -> Arc<ServiceContext> {
    let auth_service = Arc::new(AuthService::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteSessionStore::new(pool.clone())),
        settings.auth.session_duration_hours,
        settings.auth.admin_identifiers.clone(),
    ));
    let announcement_service = Arc::new(AnnouncementService::new(
        Arc::new(SqliteAnnouncementRepository::new(pool.clone())),
        settings.server.uploads_dir.clone(),
    ));
    Arc::new(ServiceContext::new(auth_service, announcement_service))
}
