use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Username or email; unique across the store.
    pub identifier: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }
}

/// Registration form after trimming.
#[derive(Debug, Clone, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Tous les champs sont requis."))]
    pub identifier: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères."))]
    pub password: String,
    pub display_name: Option<String>,
}

/// Row handed to a [`crate::repository::UserRepository`]; the password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub identifier: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
}
