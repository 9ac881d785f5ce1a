use std::sync::Arc;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{
    auth::{InMemorySessionStore, SessionStore, SqliteSessionStore},
    config::{AnnouncementBackend, Settings, UserBackend},
    repository::{
        AnnouncementRepository, InMemoryUserRepository, JsonFileAnnouncementRepository,
        SqliteAnnouncementRepository, SqliteUserRepository, UnavailableAnnouncementRepository,
        UserRepository,
    },
    service::{AnnouncementService, AuthService, ServiceContext},
};

pub async fn connect_database(settings: &Settings) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

fn needs_database(settings: &Settings) -> bool {
    settings.storage.announcements == AnnouncementBackend::Sqlite
        || settings.storage.users == UserBackend::Sqlite
}

/// Wire the configured backends. A database that cannot be opened does not
/// stop the server: announcements become unavailable and accounts fall
/// back to process memory until the next restart.
pub async fn build_services(settings: &Settings) -> Arc<ServiceContext> {
    let pool = if needs_database(settings) {
        match connect_database(settings).await {
            Ok(pool) => {
                tracing::info!("Connected to database {}", settings.database.url);
                Some(pool)
            }
            Err(e) => {
                tracing::error!(
                    "Database connection failed: {}. Running in degraded mode without persistence.",
                    e
                );
                None
            }
        }
    } else {
        None
    };

    let announcement_repo: Arc<dyn AnnouncementRepository> = match (settings.storage.announcements, &pool) {
        (AnnouncementBackend::Sqlite, Some(pool)) => {
            tracing::info!("Announcements stored in SQLite");
            Arc::new(SqliteAnnouncementRepository::new(pool.clone()))
        }
        (AnnouncementBackend::Sqlite, None) => {
            Arc::new(UnavailableAnnouncementRepository::new("database unreachable at startup"))
        }
        (AnnouncementBackend::JsonFile, _) => {
            let path = settings.storage.json_path.clone().unwrap_or_default();
            tracing::info!("Announcements read from {} (read-only)", path);
            Arc::new(JsonFileAnnouncementRepository::new(path))
        }
    };

    let (user_repo, session_store): (Arc<dyn UserRepository>, Arc<dyn SessionStore>) =
        match (settings.storage.users, &pool) {
            (UserBackend::Sqlite, Some(pool)) => {
                tracing::info!("Accounts stored in SQLite");
                (
                    Arc::new(SqliteUserRepository::new(pool.clone())),
                    Arc::new(SqliteSessionStore::new(pool.clone())),
                )
            }
            (backend, _) => {
                if backend == UserBackend::Sqlite {
                    tracing::warn!("Accounts kept in memory until the database is reachable");
                } else {
                    tracing::info!("Accounts kept in memory");
                }
                (
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemorySessionStore::new()),
                )
            }
        };

    match user_repo.count().await {
        Ok(count) => tracing::info!("{} registered accounts", count),
        Err(e) => tracing::warn!("Could not count accounts: {}", e),
    }

    let auth_service = Arc::new(AuthService::new(
        user_repo,
        session_store,
        settings.auth.session_duration_hours,
        settings.auth.admin_identifiers.clone(),
    ));
    let announcement_service = Arc::new(AnnouncementService::new(
        announcement_repo,
        settings.server.uploads_dir.clone(),
    ));

    Arc::new(ServiceContext::new(auth_service, announcement_service))
}
