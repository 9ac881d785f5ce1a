use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Genre, NewAnnouncement},
    error::AppError,
    web::{
        flash::Flash,
        templates::{HtmlTemplate, PageContext},
        uploads::save_uploaded_file,
    },
};
use super::page_context;

#[derive(Template)]
#[template(path = "announcement_new.html")]
pub struct NewAnnouncementTemplate {
    pub page: PageContext,
    pub selected_genre: String,
    pub writable: bool,
}

fn redirect_with(state: &AppState, jar: CookieJar, flash: Flash, to: &str) -> Response {
    let jar = state.flash_key.set(jar, flash);
    (jar, Redirect::to(to)).into_response()
}

fn render_form(
    state: &AppState,
    jar: CookieJar,
    current_user: &CurrentUser,
    selected_genre: String,
) -> Response {
    let (jar, mut page) = page_context(state, jar, Some(current_user));
    let writable = state.service_context.announcement_service.is_writable();
    if !writable {
        page.notify(Flash::error(
            AppError::StoreUnavailable(String::new()).user_message(),
        ));
    }
    (jar, HtmlTemplate(NewAnnouncementTemplate {
        page,
        selected_genre,
        writable,
    })).into_response()
}

// GET /ajouter-actualite
pub async fn new_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(current_user): Extension<CurrentUser>,
) -> Response {
    render_form(&state, jar, &current_user, String::new())
}

// GET /add_annonce/:genre
pub async fn new_for_genre_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(current_user): Extension<CurrentUser>,
    Path(genre_name): Path<String>,
) -> Response {
    match Genre::resolve(&genre_name) {
        Some(genre) => render_form(&state, jar, &current_user, genre.key.to_string()),
        None => redirect_with(
            &state,
            jar,
            Flash::error(format!("Genre inconnu : {}", genre_name)),
            "/",
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddAnnouncementForm {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "description")]
    pub content: String,
}

// POST /add_annonce/:genre
pub async fn add_for_genre(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(current_user): Extension<CurrentUser>,
    Path(genre_name): Path<String>,
    Form(form): Form<AddAnnouncementForm>,
) -> Response {
    let back = format!("/genre/{}", urlencoding::encode(&genre_name));

    let new = NewAnnouncement {
        title: form.title,
        content: form.content,
        genre: genre_name.clone(),
        image: None,
    };

    match state.service_context.announcement_service
        .create(new, &current_user.user.identifier)
        .await
    {
        Ok(created) => {
            let genre = Genre::display_for(&created.genre);
            redirect_with(
                &state,
                jar,
                Flash::success(format!("Annonce ajoutée avec succès au genre {} !", genre.name)),
                &format!("/genre/{}", genre.key),
            )
        }
        Err(e) => {
            tracing::warn!("Announcement rejected: {}", e);
            redirect_with(&state, jar, Flash::error(e.user_message()), &back)
        }
    }
}

fn unreadable_form(e: MultipartError) -> AppError {
    AppError::Validation(format!("Formulaire invalide : {}", e))
}

// POST /ajouter-actualite (multipart, optional image)
pub async fn add_with_upload(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Response {
    let service = &state.service_context.announcement_service;
    if !service.is_writable() {
        return redirect_with(
            &state,
            jar,
            Flash::error(AppError::StoreUnavailable(String::new()).user_message()),
            "/",
        );
    }

    let mut title = String::new();
    let mut content = String::new();
    let mut genre = String::new();
    let mut image: Option<String> = None;
    let mut upload_error: Option<AppError> = None;

    while upload_error.is_none() {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                upload_error = Some(unreadable_form(e));
                break;
            }
        };
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "title" | "content" | "description" | "genre" => match field.text().await {
                Ok(text) => match name.as_str() {
                    "title" => title = text,
                    "genre" => genre = text,
                    _ => content = text,
                },
                Err(e) => upload_error = Some(unreadable_form(e)),
            },
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                if filename.is_empty() {
                    let _ = field.bytes().await;
                    continue;
                }
                if image.is_some() {
                    upload_error = Some(AppError::Validation(
                        "Une seule image par actualité.".to_string(),
                    ));
                    continue;
                }
                match field.bytes().await {
                    Ok(data) if data.is_empty() => {}
                    Ok(data) => match save_uploaded_file(service.uploads_dir(), &filename, &data).await {
                        Ok(path) => image = Some(path),
                        Err(e) => upload_error = Some(e),
                    },
                    Err(e) => {
                        upload_error = Some(AppError::Validation(format!("Image illisible : {}", e)));
                    }
                }
            }
            _ => { let _ = field.bytes().await; }
        }
    }

    if let Some(e) = upload_error {
        tracing::warn!("Announcement form rejected: {}", e);
        if let Some(ref saved) = image {
            let _ = crate::web::uploads::delete_uploaded_file(service.uploads_dir(), saved).await;
        }
        return redirect_with(&state, jar, Flash::error(e.user_message()), "/ajouter-actualite");
    }

    let new = NewAnnouncement { title, content, genre, image };
    match service.create(new, &current_user.user.identifier).await {
        Ok(created) => redirect_with(
            &state,
            jar,
            Flash::success("Actualité publiée avec succès !"),
            &format!("/genre/{}", created.genre),
        ),
        Err(e) => {
            tracing::warn!("Announcement rejected: {}", e);
            redirect_with(&state, jar, Flash::error(e.user_message()), "/ajouter-actualite")
        }
    }
}

// POST /supprimer-actualite/:id
pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    match state.service_context.announcement_service
        .delete(&id, &current_user.user.identifier, current_user.is_admin)
        .await
    {
        Ok(deleted) => {
            let to = match Genre::find(&deleted.genre) {
                Some(genre) => format!("/genre/{}", genre.key),
                None => "/".to_string(),
            };
            redirect_with(&state, jar, Flash::success("Actualité supprimée."), &to)
        }
        Err(e) => redirect_with(&state, jar, Flash::error(e.user_message()), "/"),
    }
}
