use async_trait::async_trait;

use crate::{
    domain::{Announcement, AnnouncementFilter},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

/// Stands in for the announcement store when it could not be reached at
/// startup, so the site keeps serving pages with a notice instead of exiting.
pub struct UnavailableAnnouncementRepository {
    reason: String,
}

impl UnavailableAnnouncementRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn error(&self) -> AppError {
        AppError::StoreUnavailable(self.reason.clone())
    }
}

#[async_trait]
impl AnnouncementRepository for UnavailableAnnouncementRepository {
    async fn list(&self, _filter: &AnnouncementFilter) -> Result<Vec<Announcement>> {
        Err(self.error())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Announcement>> {
        Err(self.error())
    }

    async fn create(&self, _announcement: Announcement) -> Result<Announcement> {
        Err(self.error())
    }

    async fn delete(&self, _id: &str) -> Result<bool> {
        Err(self.error())
    }

    fn is_writable(&self) -> bool {
        false
    }
}
