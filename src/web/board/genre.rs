use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{canonical_genre_key, AnnouncementFilter, Genre},
    web::{
        flash::Flash,
        templates::{cards, AnnouncementCard, HtmlTemplate, PageContext},
    },
};
use super::{notice_for, page_context, SearchQuery};

/// Header data for a genre page; unknown names still get a page.
pub struct GenreHeader {
    pub key: String,
    pub title: String,
    pub emoji: &'static str,
    pub color: &'static str,
    pub theme: &'static str,
    pub known: bool,
}

impl GenreHeader {
    fn for_path(name: &str) -> Self {
        match Genre::resolve(name) {
            Some(genre) => Self {
                key: genre.key.to_string(),
                title: genre.name.to_string(),
                emoji: genre.emoji,
                color: genre.color,
                theme: genre.theme,
                known: true,
            },
            None => Self {
                key: canonical_genre_key(name),
                title: name.to_string(),
                emoji: "🎵",
                color: "#333333",
                theme: "unknown",
                known: false,
            },
        }
    }
}

#[derive(Template)]
#[template(path = "genre.html")]
pub struct GenreTemplate {
    pub page: PageContext,
    pub genre: GenreHeader,
    pub announcements: Vec<AnnouncementCard>,
    pub search_query: String,
    pub can_publish: bool,
}

// GET /genre/:name
pub async fn genre_page(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
    Path(name): Path<String>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let viewer = current_user.as_ref().map(|e| &e.0);
    let (jar, mut page) = page_context(&state, jar, viewer);
    let genre = GenreHeader::for_path(&name);
    let search_query = query.term();

    let announcements = if genre.known {
        let filter = AnnouncementFilter::default()
            .genre(genre.key.clone())
            .search(search_query.clone());
        match state.service_context.announcement_service.list(&filter).await {
            Ok(announcements) => cards(announcements, viewer),
            Err(e) => {
                tracing::error!("Failed to load announcements for {}: {}", genre.key, e);
                page.notify(notice_for(&e));
                Vec::new()
            }
        }
    } else {
        tracing::debug!("Unknown genre requested: {}", name);
        page.notify(Flash::info(format!("Le genre « {} » n'existe pas encore.", name)));
        Vec::new()
    };

    let can_publish = genre.known
        && viewer.is_some()
        && state.service_context.announcement_service.is_writable();

    (jar, HtmlTemplate(GenreTemplate {
        page,
        genre,
        announcements,
        search_query,
        can_publish,
    }))
}
