use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{self, SESSION_COOKIE},
    web::{flash::Flash, templates::{HtmlTemplate, PageContext}},
};

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub identifier: String,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub identifier: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(alias = "username", alias = "email", default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(alias = "username", alias = "email", default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

fn already_logged_in(state: &AppState, jar: CookieJar) -> Response {
    let jar = state.flash_key.set(jar, Flash::info("Vous êtes déjà connecté."));
    (jar, Redirect::to("/")).into_response()
}

fn with_session(state: &AppState, jar: CookieJar, token: &str) -> CookieJar {
    jar.add(auth::session_cookie(
        token,
        state.settings.server.secure_cookies,
        state.service_context.auth_service.session_duration_hours(),
    ))
}

// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
) -> Response {
    if current_user.is_some() {
        return already_logged_in(&state, jar);
    }
    let (jar, flash) = state.flash_key.take(jar);
    let template = LoginTemplate {
        page: PageContext::new(None, flash),
        identifier: String::new(),
    };
    (jar, HtmlTemplate(template)).into_response()
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if current_user.is_some() {
        return already_logged_in(&state, jar);
    }

    match state.service_context.auth_service
        .login(&form.identifier, &form.password)
        .await
    {
        Ok((_user, token)) => {
            let jar = with_session(&state, jar, &token);
            let jar = state.flash_key.set(jar, Flash::success("Connexion réussie."));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            let template = LoginTemplate {
                page: PageContext::new(None, Some(Flash::error(e.user_message()))),
                identifier: form.identifier,
            };
            (jar, HtmlTemplate(template)).into_response()
        }
    }
}

// GET /register, /signin
pub async fn register_page(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
) -> Response {
    if current_user.is_some() {
        return already_logged_in(&state, jar);
    }
    let (jar, flash) = state.flash_key.take(jar);
    let template = RegisterTemplate {
        page: PageContext::new(None, flash),
        identifier: String::new(),
        display_name: String::new(),
    };
    (jar, HtmlTemplate(template)).into_response()
}

// POST /register, /signin
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if current_user.is_some() {
        return already_logged_in(&state, jar);
    }

    match state.service_context.auth_service
        .register(&form.identifier, &form.password, form.display_name.as_deref())
        .await
    {
        Ok((_user, token)) => {
            let jar = with_session(&state, jar, &token);
            let jar = state.flash_key.set(jar, Flash::success("Compte créé et connexion réussie !"));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            let template = RegisterTemplate {
                page: PageContext::new(None, Some(Flash::error(e.user_message()))),
                identifier: form.identifier,
                display_name: form.display_name.unwrap_or_default(),
            };
            (jar, HtmlTemplate(template)).into_response()
        }
    }
}

// GET /logout
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.service_context.auth_service
            .logout(session_cookie.value())
            .await
        {
            tracing::warn!("Failed to invalidate session: {}", e);
        }
    }

    let jar = jar.add(auth::logout_cookie());
    let jar = state.flash_key.set(jar, Flash::info("Vous avez été déconnecté."));
    (jar, Redirect::to("/")).into_response()
}
