mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use musiqhub::api::{self, state::AppState};

/// The router plus the directory its uploads land in.
async fn app_with_uploads() -> anyhow::Result<(Router, TempDir)> {
    let pool = common::memory_pool().await?;
    let uploads = TempDir::new()?;
    let settings = common::test_settings(uploads.path());
    let services = common::sqlite_services(&pool, &settings);
    Ok((api::create_app(AppState::new(services, Arc::new(settings))), uploads))
}

async fn app() -> anyhow::Result<Router> {
    // Only used for routes that never write uploads.
    let (app, _uploads) = app_with_uploads().await?;
    Ok(app)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn json_body(response: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let response = app().await?.oneshot(get("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["announcements_writable"], true);
    Ok(())
}

#[tokio::test]
async fn test_genre_catalog() -> anyhow::Result<()> {
    let response = app().await?.oneshot(get("/api/genres")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    let keys: Vec<&str> = body
        .as_array()
        .map(|genres| genres.iter().filter_map(|g| g["key"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["pop", "rock", "hiphop", "jazz", "electronique"]);
    Ok(())
}

#[tokio::test]
async fn test_public_pages_render() -> anyhow::Result<()> {
    let app = app().await?;

    for uri in ["/", "/?q=jazz", "/genre/jazz", "/genre/classique", "/login", "/register", "/signin"] {
        let response = app.clone().oneshot(get(uri)).await?;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> anyhow::Result<()> {
    let response = app().await?.oneshot(get("/nulle-part")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_write_routes_require_login() -> anyhow::Result<()> {
    let app = app().await?;

    let response = app.clone().oneshot(get("/ajouter-actualite")).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app
        .clone()
        .oneshot(post_form("/add_annonce/jazz", "title=X&content=Y", None))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app
        .oneshot(post_form("/supprimer-actualite/abc", "", None))
        .await?;
    assert_eq!(location(&response), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn test_register_then_publish() -> anyhow::Result<()> {
    let app = app().await?;

    let response = app
        .clone()
        .oneshot(post_form("/register", "username=alice&password=secret1", None))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    let cookie = session_cookie(&response).expect("session cookie set on registration");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ajouter-actualite")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_form("/add_annonce/Jazz", "title=Concert&content=Ce+soir", Some(&cookie)))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/genre/jazz"));

    let response = app.oneshot(get("/api/announcements?genre=jazz")).await?;
    let body = json_body(response).await?;
    assert_eq!(body[0]["title"], "Concert");
    assert_eq!(body[0]["author"], "alice");
    assert_eq!(body[0]["genre_name"], "Jazz");
    Ok(())
}

#[tokio::test]
async fn test_bad_credentials_rerender_login() -> anyhow::Result<()> {
    let response = app()
        .await?
        .oneshot(post_form("/login", "identifier=ghost&password=whatever", None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    Ok(())
}

const BOUNDARY: &str = "musiqhub-form-boundary";

struct Part {
    name: &'static str,
    filename: Option<&'static str>,
    content: Vec<u8>,
}

fn text(name: &'static str, value: &str) -> Part {
    Part { name, filename: None, content: value.as_bytes().to_vec() }
}

fn file(name: &'static str, filename: &'static str, content: &[u8]) -> Part {
    Part { name, filename: Some(filename), content: content.to_vec() }
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post_multipart(cookie: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ajouter-actualite")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .header(header::COOKIE, cookie)
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn register(app: &Router, identifier: &str) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(post_form("/register", &format!("username={}&password=secret1", identifier), None))
        .await?;
    session_cookie(&response).ok_or_else(|| anyhow::anyhow!("no session for {}", identifier))
}

async fn listed(app: &Router, genre: &str) -> anyhow::Result<Vec<serde_json::Value>> {
    let response = app
        .clone()
        .oneshot(get(&format!("/api/announcements?genre={}", genre)))
        .await?;
    Ok(json_body(response).await?.as_array().cloned().unwrap_or_default())
}

fn stored_files(uploads: &TempDir) -> usize {
    std::fs::read_dir(uploads.path()).map(|dir| dir.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_configured_admin_name_cannot_be_claimed() -> anyhow::Result<()> {
    let (app, _uploads) = app_with_uploads().await?;
    let author = register(&app, "alice").await?;
    app.clone()
        .oneshot(post_form("/add_annonce/jazz", "title=X&content=Y", Some(&author)))
        .await?;
    let id = listed(&app, "jazz").await?[0]["id"].as_str().unwrap_or_default().to_string();

    let response = app
        .clone()
        .oneshot(post_form("/register", "username=moderator&password=secret1", None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());

    let stranger = register(&app, "mallory").await?;
    let response = app
        .clone()
        .oneshot(post_form(&format!("/supprimer-actualite/{}", id), "", Some(&stranger)))
        .await?;
    assert_eq!(location(&response), Some("/"));
    assert_eq!(listed(&app, "jazz").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_upload_then_delete_removes_image() -> anyhow::Result<()> {
    let (app, uploads) = app_with_uploads().await?;
    let cookie = register(&app, "alice").await?;

    let response = app
        .clone()
        .oneshot(post_multipart(&cookie, &[
            text("title", "Nouveau clip"),
            text("content", "Tourne a Marseille"),
            text("genre", "Hip-Hop"),
            file("image", "cover.png", b"\x89PNG\r\n"),
        ]))
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/genre/hiphop"));

    let announcement = listed(&app, "hiphop").await?.remove(0);
    let image = announcement["image"].as_str().unwrap_or_default();
    assert!(image.starts_with("uploads/") && image.ends_with(".png"), "{}", image);
    let path = uploads.path().join(image.trim_start_matches("uploads/"));
    assert!(path.exists());

    let id = announcement["id"].as_str().unwrap_or_default();
    let response = app
        .clone()
        .oneshot(post_form(&format!("/supprimer-actualite/{}", id), "", Some(&cookie)))
        .await?;
    assert_eq!(location(&response), Some("/genre/hiphop"));
    assert!(!path.exists());
    assert!(listed(&app, "hiphop").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_disallowed_extension_stores_nothing() -> anyhow::Result<()> {
    let (app, uploads) = app_with_uploads().await?;
    let cookie = register(&app, "alice").await?;

    let response = app
        .clone()
        .oneshot(post_multipart(&cookie, &[
            text("title", "Titre"),
            text("content", "Texte"),
            text("genre", "rock"),
            file("image", "payload.sh", b"#!/bin/sh\n"),
        ]))
        .await?;
    assert_eq!(location(&response), Some("/ajouter-actualite"));
    assert!(listed(&app, "rock").await?.is_empty());
    assert_eq!(stored_files(&uploads), 0);
    Ok(())
}

#[tokio::test]
async fn test_rejected_announcement_drops_its_image() -> anyhow::Result<()> {
    let (app, uploads) = app_with_uploads().await?;
    let cookie = register(&app, "alice").await?;

    let response = app
        .clone()
        .oneshot(post_multipart(&cookie, &[
            text("title", "   "),
            text("content", "Texte"),
            text("genre", "pop"),
            file("image", "cover.jpg", b"\xff\xd8\xff"),
        ]))
        .await?;
    assert_eq!(location(&response), Some("/ajouter-actualite"));
    assert!(listed(&app, "pop").await?.is_empty());
    assert_eq!(stored_files(&uploads), 0);
    Ok(())
}

#[tokio::test]
async fn test_second_image_part_is_rejected() -> anyhow::Result<()> {
    let (app, uploads) = app_with_uploads().await?;
    let cookie = register(&app, "alice").await?;

    let response = app
        .clone()
        .oneshot(post_multipart(&cookie, &[
            text("title", "Titre"),
            text("content", "Texte"),
            text("genre", "jazz"),
            file("image", "a.png", b"\x89PNG"),
            file("image", "b.png", b"\x89PNG"),
        ]))
        .await?;
    assert_eq!(location(&response), Some("/ajouter-actualite"));
    assert!(listed(&app, "jazz").await?.is_empty());
    assert_eq!(stored_files(&uploads), 0);
    Ok(())
}
