use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::User,
    error::AppError,
    web::flash::Flash,
};

#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub is_admin: bool,
}

/// Attach the session's user to the request when the cookie resolves.
/// Never rejects: an unreadable session is treated as logged out.
pub async fn resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let auth_service = &state.service_context.auth_service;

        match auth_service.current_user(session_cookie.value()).await {
            Ok(Some(user)) => {
                let is_admin = auth_service.is_admin(&user);
                request.extensions_mut().insert(CurrentUser { user, is_admin });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Session lookup failed: {}", e),
        }
    }

    next.run(request).await
}

/// Gate for write routes. Must run inside [`resolve_session`]; visitors
/// without a user are sent to the login page with a notice.
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    tracing::debug!("Anonymous request to {} redirected to login", request.uri().path());
    let jar = state
        .flash_key
        .set(jar, Flash::error(AppError::Unauthorized.user_message()));
    (jar, Redirect::to("/login")).into_response()
}
