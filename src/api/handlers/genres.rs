use axum::Json;

use crate::domain::{Genre, GENRES};

pub async fn list() -> Json<&'static [Genre]> {
    Json(&GENRES)
}
