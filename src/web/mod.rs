pub mod board;
pub mod flash;
pub mod templates;
pub mod uploads;

use axum::{
    Router,
    routing::get,
};
use crate::api::state::AppState;

pub fn create_web_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Auth pages
        .route("/login", get(templates::auth::login_page).post(templates::auth::login_handler))
        .route("/register", get(templates::auth::register_page).post(templates::auth::register_handler))
        .route("/signin", get(templates::auth::register_page).post(templates::auth::register_handler))
        .route("/logout", get(templates::auth::logout_handler))

        // Announcement board
        .merge(board::create_board_routes(state))
}
