use std::sync::{Arc, OnceLock};

use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    auth::{self, SessionStore},
    domain::{CreateUserRequest, RegisterRequest, User},
    error::{AppError, Result},
    repository::UserRepository,
};

/// Registration, login and session lookup over injected credential and session stores.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    session_duration_hours: i64,
    admin_identifiers: Vec<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        session_duration_hours: i64,
        admin_identifiers: Vec<String>,
    ) -> Self {
        Self {
            users,
            sessions,
            session_duration_hours,
            admin_identifiers,
        }
    }

    pub fn session_duration_hours(&self) -> i64 {
        self.session_duration_hours
    }

    /// Create an account and log it in. Returns the user and the raw session token.
    pub async fn register(
        &self,
        identifier: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(User, String)> {
        let request = RegisterRequest {
            identifier: identifier.trim().to_string(),
            password: password.to_string(),
            display_name: display_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        if request.identifier.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("Tous les champs sont requis.".to_string()));
        }
        request.validate()?;

        // Configured admin names are reserved for accounts created out of band.
        if self.is_reserved(&request.identifier) {
            tracing::warn!("Registration attempt for reserved identifier {}", request.identifier);
            return Err(AppError::DuplicateIdentifier(request.identifier));
        }
        if self.users.find_by_identifier(&request.identifier).await?.is_some() {
            return Err(AppError::DuplicateIdentifier(request.identifier));
        }

        let user = self
            .users
            .create(CreateUserRequest {
                identifier: request.identifier,
                display_name: request.display_name,
                password_hash: auth::hash_password(&request.password)?,
                is_admin: false,
            })
            .await?;
        tracing::info!("New user registered: {}", user.identifier);

        let token = self.open_session(&user).await?;
        Ok((user, token))
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<(User, String)> {
        let user = self.users.find_by_identifier(identifier.trim()).await?;

        let Some(user) = user else {
            // Burn the same argon2 work as a real check so response time
            // does not reveal which identifiers exist.
            if let Some(hash) = dummy_hash() {
                let _ = auth::verify_password(password, hash);
            }
            tracing::warn!("Login failed for unknown identifier");
            return Err(AppError::InvalidCredentials);
        };

        if !auth::verify_password(password, &user.password_hash)? {
            tracing::warn!("Login failed for {}", user.identifier);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.open_session(&user).await?;
        tracing::info!("User logged in: {}", user.identifier);
        Ok((user, token))
    }

    /// Idempotent; unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.delete_by_token(token).await
    }

    pub async fn current_user(&self, token: &str) -> Result<Option<User>> {
        match self.sessions.find_by_token(token).await? {
            Some(session) => self.users.find_by_id(session.user_id).await,
            None => Ok(None),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        user.is_admin || self.is_reserved(&user.identifier)
    }

    fn is_reserved(&self, identifier: &str) -> bool {
        self.admin_identifiers
            .iter()
            .any(|id| id.trim().eq_ignore_ascii_case(identifier))
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.sessions.cleanup_expired().await
    }

    async fn open_session(&self, user: &User) -> Result<String> {
        let token = auth::generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);
        self.sessions.create(user.id, &token, expires_at).await?;
        Ok(token)
    }
}

fn dummy_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();
    HASH.get_or_init(|| auth::hash_password("musiqhub-timing-equalizer").ok())
        .as_deref()
}
