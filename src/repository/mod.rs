use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod announcement_repository;
pub mod json_announcement_repository;
pub mod unavailable_repository;
pub mod user_repository;

pub use announcement_repository::SqliteAnnouncementRepository;
pub use json_announcement_repository::JsonFileAnnouncementRepository;
pub use unavailable_repository::UnavailableAnnouncementRepository;
pub use user_repository::{InMemoryUserRepository, SqliteUserRepository};

/// Credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DuplicateIdentifier` when the identifier is taken.
    async fn create(&self, user: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Matching announcements, newest first.
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Announcement>>;
    async fn create(&self, announcement: Announcement) -> Result<Announcement>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
    fn is_writable(&self) -> bool {
        true
    }
}
