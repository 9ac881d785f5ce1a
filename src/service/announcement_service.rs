use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{now_timestamp, Announcement, AnnouncementFilter, Genre, NewAnnouncement},
    error::{AppError, Result},
    repository::AnnouncementRepository,
    web::uploads,
};

/// Query and command side of the announcement store.
pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    uploads_dir: PathBuf,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &PathBuf {
        &self.uploads_dir
    }

    pub fn is_writable(&self) -> bool {
        self.repo.is_writable()
    }

    pub async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>> {
        self.repo.list(filter).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<Announcement>> {
        self.repo.find_by_id(id).await
    }

    /// Validate, stamp and store. An already-saved image is removed again
    /// when the announcement is rejected.
    pub async fn create(&self, new: NewAnnouncement, author: &str) -> Result<Announcement> {
        let image = new.image.clone();
        let result = self.insert(new, author).await;
        if result.is_err() {
            if let Some(ref image) = image {
                self.remove_image(image).await;
            }
        }
        result
    }

    async fn insert(&self, new: NewAnnouncement, author: &str) -> Result<Announcement> {
        let new = NewAnnouncement {
            title: new.title.trim().to_string(),
            content: new.content.trim().to_string(),
            genre: new.genre,
            image: new.image,
        };
        new.validate()?;

        let genre = Genre::resolve(&new.genre).ok_or_else(|| {
            AppError::Validation(format!("Genre inconnu : {}", new.genre))
        })?;

        let announcement = Announcement {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            content: new.content,
            genre: genre.key.to_string(),
            author: author.to_string(),
            timestamp: now_timestamp(),
            image: new.image,
        };

        let created = self.repo.create(announcement).await?;
        tracing::info!("Announcement {} published in {} by {}", created.id, created.genre, author);
        Ok(created)
    }

    /// Remove an announcement the requester wrote, or any announcement when
    /// `can_moderate` is set. The store is untouched on `Forbidden`.
    pub async fn delete(&self, id: &str, requester: &str, can_moderate: bool) -> Result<Announcement> {
        let announcement = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Announcement {} not found", id)))?;

        if announcement.author != requester && !can_moderate {
            tracing::warn!("{} tried to delete announcement {} owned by {}", requester, id, announcement.author);
            return Err(AppError::Forbidden);
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Announcement {} not found", id)));
        }
        tracing::info!("Announcement {} deleted by {}", id, requester);

        if let Some(ref image) = announcement.image {
            self.remove_image(image).await;
        }
        Ok(announcement)
    }

    async fn remove_image(&self, reference: &str) {
        if let Err(e) = uploads::delete_uploaded_file(&self.uploads_dir, reference).await {
            tracing::warn!("Could not remove image {}: {}", reference, e);
        }
    }
}
