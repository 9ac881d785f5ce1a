mod genre;
mod home;
mod publish;

use axum::{
    extract::DefaultBodyLimit,
    Router,
    routing::{get, post},
    middleware,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    web::{flash::Flash, templates::PageContext, uploads::MAX_FILE_SIZE},
};

/// Room for the text fields and multipart framing around an image.
const FORM_OVERHEAD: usize = 64 * 1024;

pub fn create_board_routes(state: AppState) -> Router<AppState> {
    let write_routes = Router::new()
        .route("/add_annonce/:genre", get(publish::new_for_genre_page))
        .route("/add_annonce/:genre", post(publish::add_for_genre))
        .route("/ajouter-actualite", get(publish::new_page))
        .route(
            "/ajouter-actualite",
            post(publish::add_with_upload)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + FORM_OVERHEAD)),
        )
        .route("/supprimer-actualite/:id", post(publish::delete))
        // Only reachable with a logged-in user; others are redirected to /login
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::api::middleware::auth::require_login,
        ));

    Router::new()
        .route("/", get(home::index))
        .route("/genre/:name", get(genre::genre_page))
        .merge(write_routes)
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

impl SearchQuery {
    pub fn term(&self) -> String {
        self.q.trim().to_string()
    }
}

/// Pending flash plus the layout data for the current visitor.
fn page_context(
    state: &AppState,
    jar: CookieJar,
    current_user: Option<&CurrentUser>,
) -> (CookieJar, PageContext) {
    let (jar, flash) = state.flash_key.take(jar);
    (jar, PageContext::new(current_user, flash))
}

fn notice_for(error: &crate::error::AppError) -> Flash {
    Flash::error(format!("Erreur lors du chargement des actualités : {}", error.user_message()))
}
