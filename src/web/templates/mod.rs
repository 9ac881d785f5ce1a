pub mod auth;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    http::StatusCode,
    Extension,
};
use axum_extra::extract::CookieJar;
use chrono::Datelike;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Announcement, Genre, GENRES},
    web::flash::Flash,
};

/// Layout data every page carries.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub current_user: Option<UserInfo>,
    pub is_admin: bool,
    pub notices: Vec<Flash>,
    pub genres: &'static [Genre],
    pub year: i32,
}

impl PageContext {
    pub fn new(current_user: Option<&CurrentUser>, flash: Option<Flash>) -> Self {
        Self {
            current_user: current_user.map(|c| UserInfo {
                display_name: c.user.shown_name().to_string(),
            }),
            is_admin: current_user.map(|c| c.is_admin).unwrap_or(false),
            notices: flash.into_iter().collect(),
            genres: &GENRES,
            year: chrono::Local::now().year(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Show a notice on the page being rendered, after any pending flash.
    pub fn notify(&mut self, notice: Flash) {
        self.notices.push(notice);
    }
}

#[derive(Debug, Clone)]
pub struct UserInfo {
    pub display_name: String,
}

/// Announcement prepared for display.
#[derive(Debug, Clone)]
pub struct AnnouncementCard {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub display_date: String,
    pub genre_key: &'static str,
    pub genre_name: &'static str,
    pub genre_emoji: &'static str,
    pub genre_color: &'static str,
    pub image_url: Option<String>,
    pub can_delete: bool,
}

impl AnnouncementCard {
    pub fn new(announcement: Announcement, viewer: Option<&CurrentUser>) -> Self {
        let genre = announcement.genre_info();
        let can_delete = viewer
            .map(|v| v.is_admin || v.user.identifier == announcement.author)
            .unwrap_or(false);
        Self {
            display_date: announcement.display_date(),
            image_url: announcement.image.as_deref().map(image_url),
            id: announcement.id,
            title: announcement.title,
            content: announcement.content,
            author: announcement.author,
            genre_key: genre.key,
            genre_name: genre.name,
            genre_emoji: genre.emoji,
            genre_color: genre.color,
            can_delete,
        }
    }
}

/// Stored references are site-relative (`uploads/x.png`); absolute URLs from
/// imported records are kept as they are.
fn image_url(reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        format!("/{}", reference.trim_start_matches('/'))
    }
}

pub fn cards(announcements: Vec<Announcement>, viewer: Option<&CurrentUser>) -> Vec<AnnouncementCard> {
    announcements
        .into_iter()
        .map(|a| AnnouncementCard::new(a, viewer))
        .collect()
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                ).into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
}

pub async fn not_found(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
) -> impl IntoResponse {
    let (jar, flash) = state.flash_key.take(jar);
    let page = PageContext::new(current_user.as_ref().map(|e| &e.0), flash);
    (StatusCode::NOT_FOUND, jar, HtmlTemplate(NotFoundTemplate { page }))
}
