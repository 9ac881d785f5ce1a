pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::get,
};
use tower_http::{
    compression::CompressionLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::web;
use state::AppState;

/// Full application: HTML pages, JSON read API, static files and the 404 page.
pub fn create_app(app_state: AppState) -> Router {
    let static_dir = ServeDir::new(&app_state.settings.server.static_dir);
    let uploads_dir = ServeDir::new(&app_state.settings.server.uploads_dir);

    Router::new()
        .route("/health", get(handlers::root::health_check))
        .nest("/api", api_routes())
        .merge(web::create_web_routes(app_state.clone()))
        .nest_service("/static", static_dir)
        .nest_service("/uploads", uploads_dir)
        .fallback(web::templates::not_found)
        // Every handler sees the session's user, if any
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::resolve_session,
        ))
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(handlers::genres::list))
        .route("/announcements", get(handlers::announcements::list))
}
