use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    domain::{canonical_genre_key, Announcement, AnnouncementFilter},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListAnnouncementsQuery {
    pub genre: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementResponse {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub genre_name: &'static str,
    pub genre_emoji: &'static str,
    pub display_date: String,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(announcement: Announcement) -> Self {
        let genre = announcement.genre_info();
        Self {
            genre_name: genre.name,
            genre_emoji: genre.emoji,
            display_date: announcement.display_date(),
            announcement,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListAnnouncementsQuery>,
) -> Result<Json<Vec<AnnouncementResponse>>> {
    let mut filter = AnnouncementFilter {
        limit: Some(params.limit.unwrap_or(50).clamp(1, 200)),
        ..Default::default()
    };
    if let Some(genre) = params.genre.as_deref().filter(|g| !g.trim().is_empty()) {
        filter = filter.genre(canonical_genre_key(genre));
    }
    if let Some(q) = params.q {
        filter = filter.search(q);
    }

    let announcements = state.service_context.announcement_service
        .list(&filter)
        .await?;

    Ok(Json(announcements.into_iter().map(AnnouncementResponse::from).collect()))
}
