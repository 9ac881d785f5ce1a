use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    domain::{sort_newest_first, Announcement, AnnouncementFilter},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

/// Read-only store over a JSON file holding an array of announcements.
/// The file is re-read on every call so edits show up without a restart.
pub struct JsonFileAnnouncementRepository {
    path: PathBuf,
}

impl JsonFileAnnouncementRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<Announcement>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Announcement file {} not found, listing nothing", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::StoreUnavailable(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut announcements: Vec<Announcement> = serde_json::from_str(&raw).map_err(|e| {
            AppError::StoreUnavailable(format!("malformed {}: {}", self.path.display(), e))
        })?;

        // Records without an id are addressed by position.
        for (index, announcement) in announcements.iter_mut().enumerate() {
            if announcement.id.is_empty() {
                announcement.id = index.to_string();
            }
        }
        Ok(announcements)
    }

    fn read_only() -> AppError {
        AppError::StoreUnavailable("the announcement file is read-only".to_string())
    }
}

#[async_trait]
impl AnnouncementRepository for JsonFileAnnouncementRepository {
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>> {
        let mut announcements: Vec<Announcement> = self
            .load()
            .await?
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        sort_newest_first(&mut announcements);
        if let Some(limit) = filter.limit {
            announcements.truncate(limit.max(0) as usize);
        }
        Ok(announcements)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Announcement>> {
        Ok(self.load().await?.into_iter().find(|a| a.id == id))
    }

    async fn create(&self, _announcement: Announcement) -> Result<Announcement> {
        Err(Self::read_only())
    }

    async fn delete(&self, _id: &str) -> Result<bool> {
        Err(Self::read_only())
    }

    fn is_writable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SAMPLE: &str = r#"[
        {"title": "Festival de jazz", "content": "Trois soirs de concerts", "genre": "jazz", "author": "MusicFan", "timestamp": "2024-03-01T18:00:00"},
        {"_id": "b2", "title": "Nouveau single", "description": "Un tube POP", "genre": "pop", "author_username": "AdminMusiq", "timestamp": "02/04/2024 10:30"},
        {"id": "c3", "title": "Date perdue", "content": "???", "genre": "rock", "author": "x", "timestamp": "bientôt"}
    ]"#;

    #[tokio::test]
    async fn test_lists_newest_first_with_filters() {
        let file = temp_file(SAMPLE);
        let repo = JsonFileAnnouncementRepository::new(file.path());

        let all = repo.list(&AnnouncementFilter::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b2", "0", "c3"]);

        let pop = repo.list(&AnnouncementFilter::default().search("pop")).await.unwrap();
        assert_eq!(pop.len(), 1);
        assert_eq!(pop[0].author, "AdminMusiq");

        let jazz = repo.list(&AnnouncementFilter::default().genre("jazz")).await.unwrap();
        assert_eq!(jazz.len(), 1);

        let limited = repo.list(&AnnouncementFilter::default().limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_writes_are_rejected_and_file_untouched() {
        let file = temp_file(SAMPLE);
        let repo = JsonFileAnnouncementRepository::new(file.path());

        let existing = repo.find_by_id("b2").await.unwrap().unwrap();
        assert!(matches!(repo.create(existing).await, Err(AppError::StoreUnavailable(_))));
        assert!(matches!(repo.delete("b2").await, Err(AppError::StoreUnavailable(_))));
        assert!(!repo.is_writable());
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), SAMPLE);
    }

    #[tokio::test]
    async fn test_missing_file_lists_nothing() {
        let repo = JsonFileAnnouncementRepository::new("/nonexistent/musiqhub.json");
        assert!(repo.list(&AnnouncementFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_unavailable() {
        let file = temp_file("{ not json");
        let repo = JsonFileAnnouncementRepository::new(file.path());
        assert!(matches!(
            repo.list(&AnnouncementFilter::default()).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
