use askama::Template;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::AnnouncementFilter,
    web::templates::{cards, AnnouncementCard, HtmlTemplate, PageContext},
};
use super::{notice_for, page_context, SearchQuery};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub announcements: Vec<AnnouncementCard>,
    pub search_query: String,
}

// GET /
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let viewer = current_user.as_ref().map(|e| &e.0);
    let (jar, mut page) = page_context(&state, jar, viewer);

    let search_query = query.term();
    let filter = AnnouncementFilter::default()
        .search(search_query.clone())
        .limit(state.settings.listing.home_limit);

    let announcements = match state.service_context.announcement_service.list(&filter).await {
        Ok(announcements) => cards(announcements, viewer),
        Err(e) => {
            tracing::error!("Failed to load announcements: {}", e);
            page.notify(notice_for(&e));
            Vec::new()
        }
    };

    (jar, HtmlTemplate(IndexTemplate {
        page,
        announcements,
        search_query,
    }))
}
