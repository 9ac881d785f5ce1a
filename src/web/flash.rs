//! One-shot notices carried across a redirect in a signed cookie.

use std::sync::Arc;

use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }

    /// CSS class suffix used by the layout.
    pub fn css(&self) -> &'static str {
        self.level.as_str()
    }
}

/// HMAC key for flash cookies, derived from `auth.session_secret`.
#[derive(Clone)]
pub struct FlashKey(Arc<Vec<u8>>);

impl FlashKey {
    pub fn new(secret: &str) -> Self {
        Self(Arc::new(secret.as_bytes().to_vec()))
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.0).expect("HMAC key of any size")
    }

    fn encode(&self, flash: &Flash) -> String {
        let payload = format!("{}:{}", flash.level.as_str(), urlencoding::encode(&flash.message));
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        format!("{}:{}", payload, hex::encode(mac.finalize().into_bytes()))
    }

    fn decode(&self, value: &str) -> Option<Flash> {
        let (payload, signature) = value.rsplit_once(':')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let (level, message) = payload.split_once(':')?;
        Some(Flash {
            level: FlashLevel::parse(level)?,
            message: urlencoding::decode(message).ok()?.into_owned(),
        })
    }

    /// Queue a notice for the next rendered page.
    pub fn set(&self, jar: CookieJar, flash: Flash) -> CookieJar {
        let cookie = Cookie::build((FLASH_COOKIE, self.encode(&flash)))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .build();
        jar.add(cookie)
    }

    /// Read and clear the pending notice. Tampered cookies are dropped silently.
    pub fn take(&self, jar: CookieJar) -> (CookieJar, Option<Flash>) {
        let flash = match jar.get(FLASH_COOKIE) {
            Some(cookie) => self.decode(cookie.value()),
            None => return (jar, None),
        };
        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/").build());
        (jar, flash)
    }
}
