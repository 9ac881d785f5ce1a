use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    domain::{Announcement, AnnouncementFilter},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    genre: String,
    author: String,
    timestamp: String,
    image: Option<String>,
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        Announcement {
            id: row.id,
            title: row.title,
            content: row.content,
            genre: row.genre,
            author: row.author,
            timestamp: row.timestamp,
            image: row.image,
        }
    }
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, title, content, genre, author, timestamp, image FROM announcements",
        );
        if let Some(ref genre) = filter.genre {
            query.push(" WHERE genre = ").push_bind(genre.clone());
        }
        query.push(" ORDER BY timestamp DESC");

        // SQLite's LIKE and lower() only fold ASCII, so text search runs in Rust
        // and the limit can only be pushed down when there is no search term.
        let search = filter.search_term().is_some();
        if let (Some(limit), false) = (filter.limit, search) {
            query.push(" LIMIT ").push_bind(limit);
        }

        let rows = query
            .build_query_as::<AnnouncementRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut announcements: Vec<Announcement> = rows.into_iter().map(Announcement::from).collect();
        if search {
            announcements.retain(|a| filter.matches(a));
            if let Some(limit) = filter.limit {
                announcements.truncate(limit.max(0) as usize);
            }
        }
        Ok(announcements)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, title, content, genre, author, timestamp, image
            FROM announcements
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(Announcement::from))
    }

    async fn create(&self, announcement: Announcement) -> Result<Announcement> {
        sqlx::query(
            r#"
            INSERT INTO announcements (id, title, content, genre, author, timestamp, image)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&announcement.id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(&announcement.genre)
        .bind(&announcement.author)
        .bind(&announcement.timestamp)
        .bind(&announcement.image)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(&announcement.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
